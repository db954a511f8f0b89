const LABEL_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Every name between `sub` (inclusive) and `base` (exclusive), longest
/// first. `a.b.example.com` over `example.com` yields `a.b.example.com` and
/// `b.example.com`. Empty when `sub` is not deeper than `base`.
pub fn subdomains(sub: &str, base: &str) -> Vec<String> {
    let sub_dots = sub.matches('.').count();
    let base_dots = base.matches('.').count();

    if sub_dots <= base_dots {
        return Vec::new();
    }

    let labels: Vec<&str> = sub.split('.').collect();
    (0..sub_dots - base_dots)
        .map(|i| labels[i..].join("."))
        .collect()
}

/// Random lowercase alphanumeric label of `len` characters.
pub fn random_label(rng: &mut fastrand::Rng, len: usize) -> String {
    (0..len)
        .map(|_| LABEL_ALPHABET[rng.usize(..LABEL_ALPHABET.len())] as char)
        .collect()
}
