pub mod time;

/// Random 21-char id for records that have no natural key.
pub fn longid() -> String {
    nanoid::nanoid!()
}
