//! Window Buffer - per-entity sequence history
//!
//! Holds the last H validated feature vectors of one vehicle and hands
//! out `[H, F]` windows once it is full.

use std::collections::VecDeque;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Fixed-capacity FIFO of feature vectors
#[derive(Debug, Clone)]
pub struct WindowBuffer {
    rows: VecDeque<Vec<f32>>,
    history: usize,
    feature_count: usize,
}

impl WindowBuffer {
    pub fn new(history: usize, feature_count: usize) -> Self {
        Self {
            rows: VecDeque::with_capacity(history + 1),
            history,
            feature_count,
        }
    }

    /// Append a vector, evicting the oldest once over capacity
    pub fn push(&mut self, features: Vec<f32>) {
        debug_assert_eq!(features.len(), self.feature_count);

        self.rows.push_back(features);
        while self.rows.len() > self.history {
            self.rows.pop_front();
        }
    }

    /// `[H, F]` window in arrival order, or `None` until H vectors arrived
    pub fn snapshot(&self) -> Option<Array2<f32>> {
        if self.rows.len() < self.history {
            return None;
        }

        let flat: Vec<f32> = self.rows.iter().flatten().copied().collect();
        Array2::from_shape_vec((self.history, self.feature_count), flat).ok()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.history
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn status(&self) -> BufferStatus {
        BufferStatus {
            current_size: self.rows.len(),
            required_size: self.history,
            is_ready: self.rows.len() >= self.history,
            fill_percent: if self.history > 0 {
                (self.rows.len() as f32 / self.history as f32 * 100.0).min(100.0)
            } else {
                0.0
            },
        }
    }
}

/// Buffer status information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BufferStatus {
    pub current_size: usize,
    pub required_size: usize,
    pub is_ready: bool,
    pub fill_percent: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_snapshot_none_until_full() {
        let mut buffer = WindowBuffer::new(3, 2);
        assert!(buffer.is_empty());

        buffer.push(vec![1.0, 1.0]);
        assert!(buffer.snapshot().is_none());
        buffer.push(vec![2.0, 2.0]);
        assert!(buffer.snapshot().is_none());
        assert!(!buffer.status().is_ready);

        buffer.push(vec![3.0, 3.0]);
        let window = buffer.snapshot().unwrap();
        assert_eq!(window.dim(), (3, 2));
        assert!(buffer.status().is_ready);
    }

    #[test]
    fn test_fifo_eviction() {
        let mut buffer = WindowBuffer::new(3, 2);

        for i in 0..5 {
            buffer.push(vec![i as f32, i as f32 * 10.0]);
        }

        assert_eq!(buffer.len(), 3);
        assert_eq!(
            buffer.snapshot().unwrap(),
            array![[2.0, 20.0], [3.0, 30.0], [4.0, 40.0]]
        );
    }

    #[test]
    fn test_single_step_history() {
        let mut buffer = WindowBuffer::new(1, 2);
        buffer.push(vec![0.5, 0.25]);
        assert_eq!(buffer.snapshot().unwrap(), array![[0.5, 0.25]]);

        buffer.push(vec![0.75, 1.0]);
        assert_eq!(buffer.snapshot().unwrap(), array![[0.75, 1.0]]);
    }

    #[test]
    fn test_status_and_clear() {
        let mut buffer = WindowBuffer::new(4, 1);
        buffer.push(vec![1.0]);

        let status = buffer.status();
        assert_eq!(status.current_size, 1);
        assert_eq!(status.required_size, 4);
        assert!((status.fill_percent - 25.0).abs() < f32::EPSILON);

        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 4);
    }
}
