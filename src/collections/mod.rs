mod fixed_reverse_heap;

pub use fixed_reverse_heap::FixedReverseHeap;
