//! Temporary password generation for new identity-provider accounts.

use rand::rngs::OsRng;
use rand::seq::SliceRandom;
use rand::Rng;

pub const DEFAULT_TEMP_PASSWORD_LENGTH: usize = 12;
pub const MIN_TEMP_PASSWORD_LENGTH: usize = 8;

const LOWER: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPER: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";
const SYMBOLS: &[u8] = b"!@#$%&*()-_=+";

/// Random password with at least one lowercase, uppercase, digit and symbol.
///
/// `length` below [`MIN_TEMP_PASSWORD_LENGTH`] is raised to it.
pub fn generate_temporary_password(length: usize) -> String {
    let length = length.max(MIN_TEMP_PASSWORD_LENGTH);
    let mut rng = OsRng;
    let classes = [LOWER, UPPER, DIGITS, SYMBOLS];
    let all: Vec<u8> = classes.concat();

    let mut chars: Vec<u8> = classes
        .iter()
        .map(|class| class[rng.gen_range(0..class.len())])
        .collect();
    while chars.len() < length {
        chars.push(all[rng.gen_range(0..all.len())]);
    }
    chars.shuffle(&mut rng);

    chars.into_iter().map(char::from).collect()
}
