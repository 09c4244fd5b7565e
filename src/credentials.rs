use std::fmt;
use zeroize::Zeroizing;

/// Operator-supplied root password.
///
/// The buffer is wiped when the value is dropped, `Debug` never shows it, and
/// the only way out is as stdin bytes for the elevation mechanism.
pub struct RootPassword {
    secret: Zeroizing<String>,
}

impl RootPassword {
    pub fn new(secret: String) -> Self {
        RootPassword {
            secret: Zeroizing::new(secret),
        }
    }

    /// The password followed by a newline, as the elevation helper reads it.
    pub fn stdin_payload(&self) -> Zeroizing<Vec<u8>> {
        let mut payload = Zeroizing::new(Vec::with_capacity(self.secret.len() + 1));
        payload.extend_from_slice(self.secret.as_bytes());
        payload.push(b'\n');
        payload
    }

    pub fn is_empty(&self) -> bool {
        self.secret.is_empty()
    }
}

impl fmt::Debug for RootPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RootPassword(***)")
    }
}
