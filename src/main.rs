use anyhow::Result;
use local_async_queue::{generate_mock_jobs, AsyncQueue, Job, Priority, Resource, Serial};
use tokio::time::{sleep, Instant};

/// Runs a mock job, failing after its delay if it was generated to fail
async fn simulate(job: Job) -> Result<String, String> {
    sleep(job.delay).await;
    if job.fails {
        Err(format!("{} failed on resource {}", job.id, job.resource.0))
    } else {
        Ok(job.id)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    println!("=== Dependency-Ordered Async Queue ===\n");
    println!("Generating 50 mock jobs over shared resources...");

    let jobs = generate_mock_jobs(50);
    let mut resources: Vec<Resource> = jobs.iter().map(|j| j.resource).collect();
    resources.sort_by_key(|r| r.0);
    resources.dedup();
    let total_work: u64 = jobs.iter().map(|j| j.delay.as_millis() as u64).sum();

    println!("  - Total jobs: {}", jobs.len());
    println!("  - Resources: {}", resources.len());
    println!("  - Expected failures: {}", jobs.iter().filter(|j| j.fails).count());
    println!("  - Sum of job delays: {}ms", total_work);

    // Jobs on the same resource are ordered, others overlap
    let queue: AsyncQueue<Resource> = AsyncQueue::new().named("resources");
    let started = Instant::now();
    let handles: Vec<_> = jobs
        .into_iter()
        .map(|job| {
            let resource = job.resource;
            queue.submit_fallible(None, resource, move || simulate(job))
        })
        .collect();

    let mut succeeded = 0;
    let mut failed = Vec::new();
    for handle in handles {
        match handle.await {
            Ok(_) => succeeded += 1,
            Err(e) => failed.push(e),
        }
    }

    println!("\n=== Resource Queue Summary ===");
    println!("  - Succeeded: {}", succeeded);
    println!("  - Failed: {}", failed.len());
    for e in &failed {
        println!("    * {}", e);
    }
    println!("  - Wall clock: {}ms", started.elapsed().as_millis());
    println!("  - Still pending: {}", queue.pending_count());

    // Serial queue: strictly one job at a time, in submission order
    let serial: AsyncQueue<Serial> = AsyncQueue::new().named("serial");
    let started = Instant::now();
    let handles: Vec<_> = generate_mock_jobs(5)
        .into_iter()
        .map(|job| serial.submit_serial_fallible(Some(Priority::HIGH), move || simulate(job)))
        .collect();

    println!("\n=== Serial Queue Order ===");
    for handle in handles {
        match handle.await {
            Ok(id) => println!("  -> {}", id),
            Err(e) => println!("  -> error: {}", e),
        }
    }
    println!("  - Wall clock: {}ms", started.elapsed().as_millis());

    Ok(())
}
