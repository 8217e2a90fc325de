use data_encoding::BASE32;
use magnet_url::Magnet;

pub fn is_magnet(uri: &str) -> bool {
    uri.trim_start().to_ascii_lowercase().starts_with("magnet:")
}

/// Extracts the info hash of a magnet URI as lowercase hex.
///
/// Both the 40 character hex form and the 32 character base32 form of
/// `xt=urn:btih:` are accepted.
pub fn info_hash(uri: &str) -> Option<String> {
    if !is_magnet(uri) {
        return None;
    }
    let magnet = Magnet::new(uri.trim()).ok()?;
    if !magnet.hash_type()?.eq_ignore_ascii_case("btih") {
        return None;
    }

    let hash = magnet.hash()?;
    let bytes = match hash.len() {
        40 => hex::decode(hash).ok()?,
        32 => BASE32.decode(hash.to_uppercase().as_bytes()).ok()?,
        _ => return None,
    };
    Some(hex::encode(bytes))
}
