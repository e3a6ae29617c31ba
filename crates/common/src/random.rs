//! Random test data

use rand::Rng;

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
const DIGITS: &[u8] = b"123456789";

/// Random string of `len` characters drawn from `alphabet`
pub fn random_from(len: usize, alphabet: &[u8]) -> String {
    if alphabet.is_empty() {
        return String::new();
    }
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())] as char)
        .collect()
}

/// Random ASCII letters, e.g. `"qZkTeuWb"`
pub fn random_string(len: usize) -> String {
    random_from(len, LETTERS)
}

/// Random digits without zeros, e.g. a postal code `"49312"`
pub fn random_number(len: usize) -> String {
    random_from(len, DIGITS)
}
