//! SSH public key fingerprinting.

use base64::{engine::general_purpose::STANDARD, Engine};
use sha2::{Digest, Sha256};

/// Compute the SHA-256 fingerprint of an SSH public key in OpenSSH
/// `algorithm base64-key [comment]` form.
///
/// Returns `SHA256:` followed by the unpadded base64 digest of the decoded
/// key material. Any decode failure yields `None`; a missing fingerprint
/// never fails the surrounding record.
pub fn ssh_fingerprint(public_key: &str) -> Option<String> {
    let key_data = public_key.split_whitespace().nth(1)?;
    let decoded = STANDARD.decode(key_data).ok()?;

    let digest = Sha256::digest(&decoded);
    let mut encoded = STANDARD.encode(digest);
    while encoded.ends_with('=') {
        encoded.pop();
    }

    Some(format!("SHA256:{encoded}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprints_an_ed25519_key() {
        let fingerprint = ssh_fingerprint(
            "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAINCIIiTi3hg8Lps5JvsIvNpz+8L5m52qFipjTRzGqvzM user@host",
        )
        .expect("valid key");

        assert_eq!(
            fingerprint,
            "SHA256:mZ0BOhUVicE81yPEpFJrv1rEXB2R3Y3t5nh/riicTvs"
        );
    }

    #[test]
    fn missing_key_material_yields_none() {
        assert_eq!(ssh_fingerprint("ssh-rsa"), None);
        assert_eq!(ssh_fingerprint(""), None);
    }

    #[test]
    fn invalid_base64_yields_none() {
        assert_eq!(ssh_fingerprint("ssh-rsa not-base64!!!"), None);
    }
}
