use crate::credentials::Credentials;
use sha2::{Digest, Sha512};

/// Form-encodes the parameters sorted by key.
pub fn canonical_query(
    params: &[(String, String)],
) -> Result<String, serde_urlencoded::ser::Error> {
    let mut sorted = params.to_vec();
    sorted.sort();
    serde_urlencoded::to_string(sorted)
}

/// Adds `apiKey`, `time` and `apiSig` to the parameters of an authorized request.
///
/// The signature is the 6 digit nonce followed by the hex encoded SHA-512 digest of
/// `<nonce>/<method>?<canonical query>#<secret>`.
pub fn sign(
    method: &str,
    params: &[(String, String)],
    credentials: &Credentials,
    nonce: u32,
    time: i64,
) -> Result<Vec<(String, String)>, serde_urlencoded::ser::Error> {
    let mut signed = params.to_vec();
    signed.push((String::from("apiKey"), credentials.key().to_string()));
    signed.push((String::from("time"), time.to_string()));

    let query = canonical_query(&signed)?;
    let nonce = format!("{:06}", nonce % 1_000_000);
    let source = format!("{}/{}?{}#{}", nonce, method, query, credentials.secret());
    let digest = hex::encode(Sha512::digest(source.as_bytes()));

    signed.push((String::from("apiSig"), format!("{}{}", nonce, digest)));
    Ok(signed)
}
