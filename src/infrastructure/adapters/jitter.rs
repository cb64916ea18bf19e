//! Jitter Adapter - 评分随机源
//!
//! 生产环境使用线程本地 RNG，测试中使用固定值或固定序列

use parking_lot::Mutex;
use rand::Rng;
use std::collections::VecDeque;

use crate::domain::autoplay::JitterSource;

/// 基于 thread_rng 的随机源
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRngJitter;

impl JitterSource for ThreadRngJitter {
    fn sample(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// 固定值随机源
#[derive(Debug, Clone, Copy)]
pub struct FixedJitter(pub f64);

impl JitterSource for FixedJitter {
    fn sample(&self) -> f64 {
        self.0
    }
}

/// 按顺序循环返回预设值
#[derive(Debug)]
pub struct SequenceJitter {
    values: Mutex<VecDeque<f64>>,
}

impl SequenceJitter {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: Mutex::new(values.into_iter().collect()),
        }
    }
}

impl JitterSource for SequenceJitter {
    fn sample(&self) -> f64 {
        let mut values = self.values.lock();
        match values.pop_front() {
            Some(value) => {
                values.push_back(value);
                value
            }
            None => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_rng_in_unit_range() {
        let jitter = ThreadRngJitter;
        for _ in 0..100 {
            let v = jitter.sample();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_sequence_cycles() {
        let jitter = SequenceJitter::new([0.1, 0.2]);
        assert_eq!(jitter.sample(), 0.1);
        assert_eq!(jitter.sample(), 0.2);
        assert_eq!(jitter.sample(), 0.1);
        assert_eq!(SequenceJitter::new([]).sample(), 0.0);
    }
}
