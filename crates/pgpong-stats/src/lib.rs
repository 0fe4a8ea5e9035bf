//! Small statistics helpers shared by the reward shaper and the training reports.
//!
//! - [`descriptive`]: mean, variance and standard deviation of a dataset
//!
//! # Examples
//!
//! ```
//! use pgpong_stats::descriptive::DescriptiveStats;
//!
//! let stats = DescriptiveStats::new([1.0, -1.0]).unwrap();
//! assert_eq!(stats.mean, 0.0);
//! assert_eq!(stats.std_dev, 1.0);
//! ```

pub mod descriptive;
