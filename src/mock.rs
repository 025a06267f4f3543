//! Mock workload generation for demos and tests

use crate::DependencyTracker;
use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

/// Metadata for mock jobs: jobs touching the same resource are ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Resource(pub usize);

impl DependencyTracker for Resource {
    fn is_dependency(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

/// A unit of simulated work
#[derive(Debug, Clone)]
pub struct Job {
    /// Unique identifier for this job
    pub id: String,
    /// Resource the job mutates
    pub resource: Resource,
    /// How long the job pretends to work
    pub delay: Duration,
    /// Whether the job ends with an error
    pub fails: bool,
}

/// Configuration for mock workload generation
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Number of jobs to generate
    pub job_count: usize,
    /// Number of distinct resources jobs are spread over
    pub resource_count: usize,
    /// Shortest simulated delay in milliseconds
    pub min_delay_ms: u64,
    /// Longest simulated delay in milliseconds
    pub max_delay_ms: u64,
    /// Probability (0.0-1.0) that a job fails
    pub failure_probability: f64,
    /// Whether to shuffle the output
    pub shuffle: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            job_count: 50,
            resource_count: 5,
            min_delay_ms: 10,
            max_delay_ms: 100,
            failure_probability: 0.1,
            shuffle: true,
        }
    }
}

/// Generates mock jobs spread randomly over the default number of resources
pub fn generate_mock_jobs(count: usize) -> Vec<Job> {
    generate_mock_jobs_with_config(MockConfig {
        job_count: count,
        ..Default::default()
    })
}

/// Generates mock jobs with custom configuration
pub fn generate_mock_jobs_with_config(config: MockConfig) -> Vec<Job> {
    let mut rng = rand::thread_rng();
    let resource_count = config.resource_count.max(1);
    let max_delay_ms = config.max_delay_ms.max(config.min_delay_ms);

    let mut jobs: Vec<Job> = (1..=config.job_count)
        .map(|i| Job {
            id: format!("job_{}", i),
            resource: Resource(rng.gen_range(0..resource_count)),
            delay: Duration::from_millis(rng.gen_range(config.min_delay_ms..=max_delay_ms)),
            fails: rng.gen_bool(config.failure_probability.clamp(0.0, 1.0)),
        })
        .collect();

    // Shuffle to simulate random arrival order
    if config.shuffle {
        jobs.shuffle(&mut rng);
    }

    jobs
}
