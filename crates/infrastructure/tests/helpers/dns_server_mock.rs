use hickory_proto::op::{Message, MessageType, OpCode};
use hickory_proto::rr::{RData, Record, RecordType};
use hickory_proto::serialize::binary::{BinEncodable, BinEncoder};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::UdpSocket;
use tokio::sync::oneshot;

/// Loopback UDP name server answering from a fixed table keyed by
/// question type.
pub struct MockDnsServer {
    addr: SocketAddr,
    queries: Arc<AtomicUsize>,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

#[derive(Default, Clone)]
pub struct MockBehaviour {
    pub answers: HashMap<RecordType, Vec<RData>>,
    /// Reply with a transaction id that does not match the query.
    pub wrong_id: bool,
    /// Ignore this many queries before answering.
    pub ignore_first: usize,
}

impl MockDnsServer {
    pub async fn start(behaviour: MockBehaviour) -> Result<Self, std::io::Error> {
        let socket = UdpSocket::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = socket.local_addr()?;
        let queries = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&queries);

        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            let mut buf = vec![0u8; 512];

            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => {
                        break;
                    }
                    result = socket.recv_from(&mut buf) => {
                        if let Ok((len, peer)) = result {
                            let seen = counter.fetch_add(1, Ordering::SeqCst);
                            if seen < behaviour.ignore_first {
                                continue;
                            }
                            if let Some(response) = Self::build_response(&buf[..len], &behaviour) {
                                let _ = socket.send_to(&response, peer).await;
                            }
                        }
                    }
                }
            }
        });

        Ok(Self {
            addr,
            queries,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn with_answers(answers: Vec<(RecordType, Vec<RData>)>) -> MockBehaviour {
        MockBehaviour {
            answers: answers.into_iter().collect(),
            ..MockBehaviour::default()
        }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }

    fn build_response(query: &[u8], behaviour: &MockBehaviour) -> Option<Vec<u8>> {
        let request = Message::from_vec(query).ok()?;
        let question = request.queries().first()?.clone();

        let id = if behaviour.wrong_id {
            request.id().wrapping_add(1)
        } else {
            request.id()
        };

        let mut response = Message::new(id, MessageType::Response, OpCode::Query);
        response.set_recursion_desired(true);
        response.set_recursion_available(true);
        response.add_query(question.clone());

        for rdata in behaviour
            .answers
            .get(&question.query_type())
            .into_iter()
            .flatten()
        {
            response.add_answer(Record::from_rdata(
                question.name().clone(),
                60,
                rdata.clone(),
            ));
        }

        let mut buf = Vec::with_capacity(512);
        let mut encoder = BinEncoder::new(&mut buf);
        response.emit(&mut encoder).ok()?;
        Some(buf)
    }

    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockDnsServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
