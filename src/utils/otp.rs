use argon2::password_hash::rand_core::{OsRng, RngCore};
use chrono::{DateTime, Duration, Utc};

use crate::config::OTP_EXPIRY_MINUTES;

/// Generates a 6-digit one-time passcode and its expiry timestamp.
///
/// Drawn from the OS RNG, same source used for password salts.
pub fn generate_otp() -> (String, DateTime<Utc>) {
    let code = 100_000 + OsRng.next_u32() % 900_000;
    let expires = Utc::now() + Duration::minutes(OTP_EXPIRY_MINUTES);
    (code.to_string(), expires)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn otp_is_six_digits() {
        for _ in 0..100 {
            let (code, _) = generate_otp();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
    }

    #[test]
    fn otp_expires_in_the_future() {
        let (_, expires) = generate_otp();
        assert!(expires > Utc::now());
        assert!(expires <= Utc::now() + Duration::minutes(OTP_EXPIRY_MINUTES));
    }
}
