//! Circular window for LZ type compression dictionaries.
//!
//! The write head only moves forward; once the buffer is full every insert
//! displaces the oldest element.  A separate read cursor gives relative
//! random access without disturbing the head.  Access outside the live
//! range `[head - capacity + 1, head]` is an error rather than a wrap.

use crate::Error;
use num_traits::PrimInt;

pub struct SlidingWindow<T: PrimInt> {
    buf: Vec<T>,
    n: usize,
    /// absolute position of the last inserted element, -1 while empty
    head: i64,
    /// absolute position of the read cursor, moved only by the caller
    cursor: i64,
}

impl<T: PrimInt> SlidingWindow<T> {
    pub fn new(fill: T, n: usize) -> Self {
        Self {
            buf: vec![fill; n],
            n,
            head: -1,
            cursor: 0,
        }
    }
    /// absolute position of the newest element
    pub fn head(&self) -> i64 {
        self.head
    }
    pub fn is_full(&self) -> bool {
        self.head + 1 >= self.n as i64
    }
    /// Insert at the head, returning the displaced element once the
    /// window has filled up.
    pub fn insert(&mut self, val: T) -> Option<T> {
        self.head += 1;
        let slot = (self.head % self.n as i64) as usize;
        let out = match self.head >= self.n as i64 {
            true => Some(self.buf[slot]),
            false => None,
        };
        self.buf[slot] = val;
        out
    }
    /// absolute position of the cursor
    pub fn cursor(&self) -> i64 {
        self.cursor
    }
    /// advance cursor by 1
    pub fn advance(&mut self) {
        self.cursor += 1;
    }
    /// get value at cursor + offset, cursor does not move
    pub fn read(&self, offset: i64) -> Result<T, Error> {
        self.get_abs(self.cursor + offset)
    }
    /// get value at absolute position
    pub fn get_abs(&self, abs: i64) -> Result<T, Error> {
        if abs < 0 || abs > self.head || abs + self.n as i64 <= self.head {
            return Err(Error::OutOfBounds);
        }
        Ok(self.buf[(abs % self.n as i64) as usize])
    }
}

// *************** TESTS *****************

#[test]
fn insert_reports_displacement() {
    let mut win: SlidingWindow<u8> = SlidingWindow::new(0, 4);
    assert_eq!(win.insert(10), None);
    assert_eq!(win.insert(11), None);
    assert_eq!(win.insert(12), None);
    assert_eq!(win.insert(13), None);
    assert!(win.is_full());
    // fifth insert wraps and displaces the oldest
    assert_eq!(win.insert(14), Some(10));
    assert_eq!(win.head(), 4);
    assert_eq!(win.get_abs(4), Ok(14));
    assert_eq!(win.get_abs(1), Ok(11));
}

#[test]
fn bounds_are_enforced() {
    let mut win: SlidingWindow<u8> = SlidingWindow::new(0, 4);
    for v in 0..6 {
        win.insert(v);
    }
    // live range is [2,5]
    assert_eq!(win.get_abs(5), Ok(5));
    assert_eq!(win.get_abs(2), Ok(2));
    assert_eq!(win.get_abs(1), Err(Error::OutOfBounds));
    assert_eq!(win.get_abs(6), Err(Error::OutOfBounds));
    assert_eq!(win.get_abs(-1), Err(Error::OutOfBounds));
}

#[test]
fn cursor_reads_are_relative() {
    let mut win: SlidingWindow<u16> = SlidingWindow::new(0, 8);
    for v in 100..105 {
        win.insert(v);
    }
    win.advance();
    win.advance();
    assert_eq!(win.cursor(), 2);
    assert_eq!(win.read(0), Ok(102));
    assert_eq!(win.read(-2), Ok(100));
    assert_eq!(win.read(2), Ok(104));
    assert_eq!(win.read(3), Err(Error::OutOfBounds));
}
