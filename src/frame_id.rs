use std::{
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{Hash, Hasher},
};

use crate::types::{FileDesc, PageNum};

// FrameId identifies the page cached in a frame, the buffer pool uses
// it as the key of its frame table.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct FrameId {
    file_desc: FileDesc,
    page_num: PageNum,
}

impl FrameId {
    pub fn new(file_desc: FileDesc, page_num: PageNum) -> Self {
        Self {
            file_desc,
            page_num,
        }
    }

    pub fn equal_to(&self, other: &FrameId) -> bool {
        self.file_desc == other.file_desc && self.page_num == other.page_num
    }

    pub fn file_desc(&self) -> FileDesc {
        self.file_desc
    }

    pub fn page_num(&self) -> PageNum {
        self.page_num
    }

    /// Pack both fields into one 64-bit key: the file handle takes the
    /// high half and the page number the low half.
    ///
    /// Both halves are zero-extended, so a negative page number can
    /// never spill into the file handle bits.
    pub fn key(&self) -> u64 {
        ((self.file_desc as u32 as u64) << 32) | (self.page_num as u32 as u64)
    }

    /// A deterministic hash of the id, stable within one build.
    pub fn hash_value(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

impl Hash for FrameId {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.key());
    }
}

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "fd:{},page_num:{}", self.file_desc, self.page_num)
    }
}

impl fmt::Debug for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_equality() {
        assert_eq!(FrameId::new(3, 7), FrameId::new(3, 7));
        assert!(FrameId::new(3, 7).equal_to(&FrameId::new(3, 7)));

        assert_ne!(FrameId::new(3, 7), FrameId::new(3, 8));
        assert_ne!(FrameId::new(3, 7), FrameId::new(4, 7));
        assert!(!FrameId::new(3, 7).equal_to(&FrameId::new(4, 7)));
    }

    #[test]
    fn test_hash() {
        let a = FrameId::new(3, 7);
        let b = FrameId::new(3, 7);
        assert_eq!(a.hash_value(), b.hash_value());

        let c = FrameId::new(3, 8);
        assert_ne!(a.hash_value(), c.hash_value());
    }

    #[test]
    fn test_key_keeps_fields_apart() {
        assert_eq!(FrameId::new(1, 0).key(), 1 << 32);
        assert_eq!(FrameId::new(0, 1).key(), 1);

        // a negative page number must not leak into the fd half
        assert_ne!(FrameId::new(0, -1).key(), FrameId::new(-1, -1).key());
        assert_eq!(FrameId::new(0, -1).key() >> 32, 0);
    }

    #[test]
    fn test_as_map_key() {
        let mut m = HashMap::new();
        m.insert(FrameId::new(3, 7), "a");
        m.insert(FrameId::new(3, 8), "b");

        assert_eq!(m.get(&FrameId::new(3, 7)), Some(&"a"));
        assert_eq!(m.get(&FrameId::new(3, 8)), Some(&"b"));
        assert_eq!(m.get(&FrameId::new(4, 7)), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(FrameId::new(3, 7).to_string(), "fd:3,page_num:7");
    }
}
