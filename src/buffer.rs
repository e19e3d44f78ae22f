use std::fmt;

/// Fixed-capacity text buffer living on the stack (or in thread-local storage).
///
/// Writes behave like `snprintf` into a `CAP`-byte array: at most `CAP - 1`
/// bytes of content are kept, the rest is silently cut off, and the slot after
/// the content always holds a terminating zero. Formatting never allocates and
/// never fails, which is what the drop path of a timer needs.
///
/// # Examples
///
/// ```
/// # use scope_timer::buffer::FixedBuf;
/// use std::fmt::Write;
///
/// let mut buf = FixedBuf::<8>::new();
/// write!(buf, "{}-{}", 1234, 5678).unwrap();
/// assert_eq!(buf.as_bytes(), b"1234-56");
/// assert!(buf.is_truncated());
/// ```
#[derive(Clone)]
pub struct FixedBuf<const CAP: usize> {
    bytes: [u8; CAP],
    len: usize,
    truncated: bool,
}

impl<const CAP: usize> FixedBuf<CAP> {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self {
            bytes: [0u8; CAP],
            len: 0,
            truncated: false,
        }
    }

    /// Number of content bytes that fit, one slot being reserved for the terminator.
    pub const fn capacity() -> usize {
        CAP.saturating_sub(1)
    }

    /// Empties the buffer so it can be reused without reallocation.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
        self.truncated = false;
        if CAP > 0 {
            self.bytes[0] = 0;
        }
    }

    /// Appends raw bytes, truncating at capacity.
    pub fn push_bytes(&mut self, data: &[u8]) {
        let room = Self::capacity() - self.len;
        let take = data.len().min(room);
        if take < data.len() {
            self.truncated = true;
        }
        self.bytes[self.len..self.len + take].copy_from_slice(&data[..take]);
        self.len += take;
        if CAP > 0 {
            self.bytes[self.len] = 0;
        }
    }

    /// Content bytes, excluding the terminator. Length is explicit, so
    /// embedded zero bytes are carried through unchanged.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    /// Content as text. A cut through the middle of a multi-byte character
    /// drops the partial character from the returned view.
    pub fn as_str(&self) -> &str {
        match std::str::from_utf8(self.as_bytes()) {
            Ok(s) => s,
            Err(e) => {
                // valid_up_to is always a char boundary
                std::str::from_utf8(&self.bytes[..e.valid_up_to()]).unwrap_or_default()
            }
        }
    }

    /// Content bytes followed by the terminating zero.
    pub fn as_bytes_with_nul(&self) -> &[u8] {
        &self.bytes[..(self.len + 1).min(CAP)]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether any write since the last `clear` was cut short.
    #[inline]
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

impl<const CAP: usize> Default for FixedBuf<CAP> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const CAP: usize> fmt::Write for FixedBuf<CAP> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push_bytes(s.as_bytes());
        Ok(())
    }
}

impl<const CAP: usize> fmt::Debug for FixedBuf<CAP> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedBuf")
            .field("content", &String::from_utf8_lossy(self.as_bytes()))
            .field("truncated", &self.truncated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt::Write;

    #[test]
    fn test_exact_fit() {
        let mut buf = FixedBuf::<16>::new();
        write!(buf, "hello").unwrap();
        assert_eq!(buf.len(), 5);
        assert_eq!(buf.as_str(), "hello");
        assert!(!buf.is_truncated());
        assert_eq!(buf.as_bytes_with_nul(), b"hello\0");
    }

    #[test]
    fn test_truncates_at_capacity_minus_one() {
        let mut buf = FixedBuf::<5>::new();
        buf.push_bytes(b"YYYYYYYYYY");
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.as_bytes(), b"YYYY");
        assert_eq!(buf.as_bytes_with_nul()[4], 0);
        assert!(buf.is_truncated());
    }

    #[test]
    fn test_clear_reuses_storage() {
        let mut buf = FixedBuf::<8>::new();
        write!(buf, "abcdefghij").unwrap();
        assert!(buf.is_truncated());
        buf.clear();
        assert!(buf.is_empty());
        assert!(!buf.is_truncated());
        write!(buf, "xy").unwrap();
        assert_eq!(buf.as_str(), "xy");
    }

    #[test]
    fn test_embedded_nul_is_preserved() {
        let mut buf = FixedBuf::<16>::new();
        buf.push_bytes(b"a\0b\n");
        assert_eq!(buf.len(), 4);
        assert_eq!(buf.as_bytes(), b"a\0b\n");
    }

    #[test]
    fn test_partial_multibyte_char_is_hidden() {
        let mut buf = FixedBuf::<4>::new();
        write!(buf, "aé€").unwrap();
        // 'a' (1) + 'é' (2) fill the 3 content bytes exactly
        assert_eq!(buf.as_str(), "aé");

        let mut buf = FixedBuf::<3>::new();
        write!(buf, "aé").unwrap();
        assert_eq!(buf.len(), 2);
        assert_eq!(buf.as_str(), "a");
    }
}
