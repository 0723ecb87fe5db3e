//! Headless drift harness
//!
//! Spawns a population into an in-memory host, loses a fraction of the
//! add/remove notifications on purpose, and lets the periodic sweep repair
//! the registry. Prints per-interval stats so the repair behavior is easy
//! to eyeball.

use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Instant;

use sim_mirror::core::config::MirrorConfig;
use sim_mirror::core::types::{PersistentId, Side, WorldId};
use sim_mirror::entity::KindFilter;
use sim_mirror::source::{ExternalHandle, InMemoryHost};
use sim_mirror::world::WorldDirectory;

/// Exercise the mirror registry against a lossy notification stream
#[derive(Parser, Debug)]
#[command(name = "drift_sim")]
#[command(about = "Run the entity mirror against a host that drops notifications")]
struct Args {
    /// Number of entities to spawn up front
    #[arg(long, default_value_t = 500)]
    entities: usize,

    /// Ticks to run
    #[arg(long, default_value_t = 200)]
    ticks: u64,

    /// Probability that any single add/remove notification is lost
    #[arg(long, default_value_t = 0.2)]
    drop_rate: f64,

    /// Ticks between drift sweeps
    #[arg(long, default_value_t = 20)]
    reconcile_interval: u64,

    /// Entities churned (despawned + respawned) per tick
    #[arg(long, default_value_t = 2)]
    churn: usize,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter("sim_mirror=warn")
        .init();

    let args = Args::parse();
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let config = MirrorConfig {
        reconcile_interval: args.reconcile_interval,
        ..MirrorConfig::default()
    };
    config.validate().expect("invalid arguments");

    let overworld = WorldId(0);
    let mut host = InMemoryHost::new();
    let mut worlds = WorldDirectory::new(config);
    worlds.world_loaded(overworld, Side::Authoritative);

    println!(
        "=== DRIFT SIM: {} entities, {} ticks, {:.0}% notification loss ===\n",
        args.entities,
        args.ticks,
        args.drop_rate * 100.0
    );

    // One connected player plus a mixed population
    let avatar = ExternalHandle::player(host.allocate_session(), PersistentId::new());
    host.connect_player(overworld, avatar.clone());
    worlds
        .get_mut(overworld, Side::Authoritative)
        .unwrap()
        .entity_added(&avatar);

    let mut population = Vec::with_capacity(args.entities);
    for i in 0..args.entities {
        let session = host.allocate_session();
        let handle = match i % 5 {
            0 => ExternalHandle::scripted(session, PersistentId::new(), "freight_cart"),
            1 | 2 => ExternalHandle::living(session, PersistentId::new()),
            _ => ExternalHandle::generic(session, PersistentId::new()),
        };
        let world = worlds.get_mut(overworld, Side::Authoritative).unwrap();
        world.spawn_entity(&mut host, &handle);
        // Lossy delivery of the add notification
        if rng.gen::<f64>() >= args.drop_rate {
            world.entity_added(&handle);
        }
        population.push(handle);
    }

    {
        let world = worlds.get(overworld, Side::Authoritative).unwrap();
        println!(
            "Spawned {} handles, mirror tracked {} before the first sweep",
            host.loaded_count(overworld),
            world.entity_count()
        );
    }

    let interval = args.reconcile_interval;
    worlds.on_tick(move |world| {
        if world.ticks() % interval == 0 {
            println!(
                "Tick {:>4}: tracked {:>4} | living {:>3} | carts {:>3} | tps {:>5.1}",
                world.ticks(),
                world.entity_count(),
                world.entities(&KindFilter::Living).len(),
                world
                    .entities(&KindFilter::Custom("freight_cart".to_string()))
                    .len(),
                world.tps(20)
            );
        }
    });

    for _ in 0..args.ticks {
        let start = Instant::now();

        // Churn: despawn a few existing handles, spawn replacements,
        // losing notifications at the configured rate either way
        for _ in 0..args.churn.min(population.len()) {
            let victim = population.swap_remove(rng.gen_range(0..population.len()));
            let world = worlds.get_mut(overworld, Side::Authoritative).unwrap();
            world.remove_entity(&mut host, victim.session_id());
            if rng.gen::<f64>() >= args.drop_rate {
                world.entity_removed(victim.session_id());
            }

            let replacement = if rng.gen::<bool>() {
                ExternalHandle::living(host.allocate_session(), PersistentId::new())
            } else {
                ExternalHandle::generic(host.allocate_session(), PersistentId::new())
            };
            let world = worlds.get_mut(overworld, Side::Authoritative).unwrap();
            world.spawn_entity(&mut host, &replacement);
            if rng.gen::<f64>() >= args.drop_rate {
                world.entity_added(&replacement);
            }
            population.push(replacement);
        }

        worlds.handle_tick(overworld, Side::Authoritative, &mut host);
        let elapsed = start.elapsed();
        worlds
            .get_mut(overworld, Side::Authoritative)
            .unwrap()
            .record_tick_duration(elapsed);
    }

    // Ghost scenario: the player disconnects but the host forgets to
    // unload the avatar; the next sweep evicts it host-side
    host.disconnect_player(avatar.persistent_id());
    worlds
        .get_mut(overworld, Side::Authoritative)
        .unwrap()
        .entity_removed(avatar.session_id());
    let world = worlds.get_mut(overworld, Side::Authoritative).unwrap();
    world.reconcile(&mut host);

    let world = worlds.get(overworld, Side::Authoritative).unwrap();
    println!("\n=== Final State ===");
    println!("Host loaded:    {}", host.loaded_count(overworld));
    println!("Mirror tracked: {}", world.entity_count());
    println!(
        "Ghost avatar still loaded host-side: {}",
        host.is_loaded(overworld, avatar.session_id())
    );

    let mut kinds: Vec<String> = world
        .registry()
        .iter()
        .map(|e| format!("{:?}", e.kind()))
        .collect();
    kinds.sort();
    kinds.dedup();
    println!("Kinds present:  {}", kinds.join(", "));

    if host.loaded_count(overworld) == world.entity_count() {
        println!("\nMirror converged with the host.");
    } else {
        println!("\nMirror has not converged; raise --ticks or lower --drop-rate.");
    }
}
