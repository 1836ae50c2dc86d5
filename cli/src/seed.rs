//! Demo dataset generation. Everything goes through the store's ingest
//! operations, so the result obeys the same ownership rules as real data.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use store::{InMemoryStore, MetricSample, ResourceUsageSample, StoreResult};

#[derive(Debug, Clone, Copy)]
pub struct SeedOptions {
    pub seed: u64,
    pub experiments: usize,
    pub epochs: i64,
}

pub fn demo_store(opts: SeedOptions) -> StoreResult<InMemoryStore> {
    let store = InMemoryStore::new();
    let mut rng = StdRng::seed_from_u64(opts.seed);

    let demo = store.register_user("demo", "demo@runledger.dev")?;
    let guest = store.register_user("guest", "guest@runledger.dev")?;

    let projects = [
        store.create_project(demo.id, "vision", "Image classification baselines")?,
        store.create_project(demo.id, "speech", "Keyword spotting")?,
    ];
    let sandbox = store.create_project(guest.id, "sandbox", "")?;
    let guest_run = store.create_experiment(guest.id, Some(sandbox.id), "smoke test", &mut rng)?;
    store.add_metric(guest.id, MetricSample::new(guest_run.id, 1, 0.5, 0.5, 0.5, 0.9))?;

    for i in 0..opts.experiments {
        // Every third run is left outside any project.
        let project = (i % 3 != 2).then(|| projects[i % 2].id);
        let exp = store.create_experiment(demo.id, project, "", &mut rng)?;

        let base: f64 = rng.gen_range(0.55..0.8);
        for epoch in 1..=opts.epochs.max(1) {
            let progress = epoch as f64 / opts.epochs.max(1) as f64;
            let accuracy = (base + 0.15 * progress + rng.gen_range(-0.02..0.02)).clamp(0.0, 1.0);
            let precision = (accuracy - rng.gen_range(0.0..0.05)).max(0.0);
            let recall = (accuracy - rng.gen_range(0.0..0.08)).max(0.0);
            let loss = (1.2 * (-2.5 * progress).exp() + rng.gen_range(0.0..0.05)).max(0.01);
            store.add_metric(
                demo.id,
                MetricSample::new(exp.id, epoch, accuracy, precision, recall, loss),
            )?;

            let mut usage = ResourceUsageSample::empty(exp.id, epoch);
            usage.cpu_percent = Some(rng.gen_range(30.0..95.0));
            usage.memory_mb = Some(rng.gen_range(1024.0..8192.0));
            if rng.gen_bool(0.5) {
                usage.gpu_percent = Some(rng.gen_range(40.0..100.0));
                usage.gpu_memory_mb = Some(rng.gen_range(2048.0..16384.0));
            }
            usage.training_time_sec = Some(rng.gen_range(5.0..40.0));
            store.add_resource_usage(demo.id, usage)?;
        }

        if i % 2 == 0 {
            store.attach_model(demo.id, exp.id, &format!("models/{}.pt", exp.name))?;
        }
    }

    Ok(store)
}
