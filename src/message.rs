//! Opaque message payloads.
//!
//! `Message` is transparent to everything in this crate except the user
//! callbacks a vertex invokes. The byte-level wire format is out of scope
//! (spec.md §1); this is simply a `Vec<u8>` newtype so the scheduler never
//! has to name a concrete payload type.

/// An opaque, scheduler-transparent payload.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Message(pub Vec<u8>);

impl Message {
    pub fn new(bytes: Vec<u8>) -> Self {
        Message(bytes)
    }

    pub fn from_str(s: &str) -> Self {
        Message(s.as_bytes().to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message::from_str(s)
    }
}

impl From<Vec<u8>> for Message {
    fn from(bytes: Vec<u8>) -> Self {
        Message(bytes)
    }
}
