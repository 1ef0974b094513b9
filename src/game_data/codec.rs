/*!
 * TSC script obfuscation.
 *
 * Every byte of a script is shifted by the value of the byte in the middle of
 * the file; the middle byte itself is stored as-is, so it doubles as the key.
 */

/// Recover the plain script text bytes from a `.tsc` file
pub fn decode_script(bytes: &[u8]) -> Vec<u8> {
    shift(bytes, u8::wrapping_sub)
}

/// Obfuscate plain script bytes for writing to a `.tsc` file
pub fn encode_script(bytes: &[u8]) -> Vec<u8> {
    shift(bytes, u8::wrapping_add)
}

fn shift(bytes: &[u8], op: fn(u8, u8) -> u8) -> Vec<u8> {
    let key_index = bytes.len() / 2;
    let Some(&key) = bytes.get(key_index) else {
        return Vec::new();
    };

    bytes
        .iter()
        .enumerate()
        .map(|(i, &byte)| if i == key_index { byte } else { op(byte, key) })
        .collect()
}
