//! Binary min-heap used to build Huffman trees.

/// Min-heap over a growable array.  Elements come out smallest first by
/// their `Ord`; ties resolve by heap mechanics and carry no meaning.
pub struct MinHeap<T> {
    heap: Vec<T>,
}

impl<T: Ord> MinHeap<T> {
    pub fn new() -> Self {
        Self { heap: Vec::new() }
    }
    pub fn len(&self) -> usize {
        self.heap.len()
    }
    /// Add an element in O(log n).
    pub fn push(&mut self, e: T) {
        self.heap.push(e);
        self.sift_up(self.heap.len() - 1);
    }
    /// Remove and return the smallest element in O(log n).
    pub fn pop(&mut self) -> Option<T> {
        if self.heap.is_empty() {
            return None;
        }
        let last = self.heap.len() - 1;
        self.heap.swap(0, last);
        let ans = self.heap.pop();
        if !self.heap.is_empty() {
            self.sift_down(0);
        }
        ans
    }
    fn sift_up(&mut self, mut i: usize) {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.heap[i] >= self.heap[parent] {
                break;
            }
            self.heap.swap(i, parent);
            i = parent;
        }
    }
    fn sift_down(&mut self, mut i: usize) {
        loop {
            let mut least = i;
            for child in [2 * i + 1, 2 * i + 2] {
                if child < self.heap.len() && self.heap[child] < self.heap[least] {
                    least = child;
                }
            }
            if least == i {
                break;
            }
            self.heap.swap(i, least);
            i = least;
        }
    }
}

// *************** TESTS *****************

#[test]
fn pops_in_ascending_order() {
    let mut heap = MinHeap::new();
    for v in [42, 7, 19, 7, 0, 100, 63, 1] {
        heap.push(v);
    }
    let mut drained = Vec::new();
    while let Some(v) = heap.pop() {
        drained.push(v);
    }
    assert_eq!(drained, vec![0, 1, 7, 7, 19, 42, 63, 100]);
}

#[test]
fn interleaved_push_and_pop() {
    let mut heap = MinHeap::new();
    heap.push((3u64, 0usize));
    heap.push((1, 1));
    assert_eq!(heap.pop(), Some((1, 1)));
    heap.push((2, 2));
    heap.push((0, 3));
    assert_eq!(heap.pop(), Some((0, 3)));
    assert_eq!(heap.pop(), Some((2, 2)));
    assert_eq!(heap.len(), 1);
    assert_eq!(heap.pop(), Some((3, 0)));
    assert_eq!(heap.pop(), None);
}
