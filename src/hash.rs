use crate::MigrationError;

/// Map a topic name to its rotation start offset in `[0, size)`.
///
/// The value is the sum of the name's character code points modulo `size`.
/// It only needs to be stable across runs and to spread topics over different
/// starting brokers, so no real hashing is involved.
pub fn topic_start_bias(name: &str, size: usize) -> Result<usize, MigrationError> {
    if size == 0 {
        return Err(MigrationError::InvalidConfiguration(
            "cannot derive a start bias over an empty broker set".to_string(),
        ));
    }

    let sum: u64 = name.chars().map(|c| u64::from(u32::from(c))).sum();
    Ok((sum % size as u64) as usize)
}
