//! Headless soak runner
//!
//! Drives the simulation through the message protocol against a recording
//! surface with a synthetic 60 Hz clock, and logs entity counts once per
//! simulated second. Usage: `fireworks-bg [seconds] [seed]`.

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use fireworks_bg::consts::*;
    use fireworks_bg::platform::{Effect, Message, Outbox, Transport};
    use fireworks_bg::renderer::DrawList;
    use fireworks_bg::{Config, Simulation, Surface, Theme, Viewport};
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let seconds: u64 = parse_arg(args.next(), 30, "seconds");
    let seed: u64 = parse_arg(args.next(), 1, "seed");
    log::info!("soak run: {seconds}s, seed {seed}");

    let viewport = Viewport::new(1280.0, 720.0, 1.0);
    let config = Config::background_layer(Theme::Dark, false);
    let max_ships = config.max_ships;

    let mut sim = Simulation::new(seed);
    let mut surface = DrawList::new();
    let mut outbox = Outbox::new();
    let mut input = Pcg32::seed_from_u64(seed ^ 0x5eed);

    let post = |outbox: &mut Outbox, message: Message| {
        if let Err(e) = outbox.post(message) {
            log::warn!("{e}");
        }
    };
    post(&mut outbox, Message::init(viewport, config));

    let mut now = 0.0;
    let mut peak = sim.counts();
    let mut violations = 0u32;
    let end = seconds as f64 * 1000.0;
    let mut next_report = 1000.0;

    while now < end {
        now += REFERENCE_FRAME_MS;

        // A handful of clicks early in every second
        let into_second = now % 1000.0;
        if into_second < 250.0 && input.random_bool(0.25) {
            let x = input.random_range(0.0..viewport.width);
            let y = input.random_range(0.0..viewport.height);
            post(&mut outbox, Message::Pointer { x, y });
        }
        // Hide for a moment in the middle of the run
        if (now - end / 2.0).abs() < REFERENCE_FRAME_MS / 2.0 {
            post(&mut outbox, Message::Visibility { hidden: true });
        }
        if (now - end / 2.0 - 500.0).abs() < REFERENCE_FRAME_MS / 2.0 {
            post(&mut outbox, Message::Visibility { hidden: false });
        }

        for effect in outbox.deliver(&mut sim, now) {
            match effect {
                Effect::Bind(vp) | Effect::Resize(vp) => surface.resize(&vp),
                Effect::Suspend => log::info!("suspended at {:.0} ms", now),
                Effect::Resume => log::info!("resumed at {:.0} ms", now),
                Effect::Nothing => {}
            }
        }
        sim.tick(now, &mut surface);

        let counts = sim.counts();
        if counts.particles > MAX_PARTICLES || counts.fireworks > MAX_FIREWORKS || counts.ships > max_ships {
            violations += 1;
            log::error!("cap exceeded at {now:.0} ms: {counts:?}");
        }
        peak.particles = peak.particles.max(counts.particles);
        peak.fireworks = peak.fireworks.max(counts.fireworks);
        peak.ships = peak.ships.max(counts.ships);
        peak.pooled = peak.pooled.max(counts.pooled);

        if now >= next_report {
            next_report += 1000.0;
            log::info!(
                "t={:>3}s particles={:>4} fireworks={:>2} ships={:>2} pooled={:>4}",
                (now / 1000.0) as u64,
                counts.particles,
                counts.fireworks,
                counts.ships,
                counts.pooled
            );
        }
    }

    log::info!(
        "done: {} frames, {} draw commands, peak {:?}",
        surface.frames,
        surface.total_commands,
        peak
    );
    if violations > 0 {
        log::error!("{violations} frames exceeded a cap");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_arg<T: std::str::FromStr>(arg: Option<String>, default: T, name: &str) -> T {
    match arg {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            log::warn!("invalid {name} {raw:?}, using default");
            default
        }),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The browser entry points live in the library
}
