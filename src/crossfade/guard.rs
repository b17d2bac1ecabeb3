use log::trace;

use super::pair::{Crossfade, FadeCurve};
use super::playhead::{PlayheadTracker, TransportEvent};
use crate::audio::ModBuffer;
use crate::traits::{BlockContext, ModGenerator};
use crate::transport::TransportSnapshot;
use crate::utils::buffer_ops::crossfade_buffers;

/// The part of a generator that can run twice side by side.
pub trait FadeCore: Clone {
    type Params: Copy + PartialEq;

    /// Largest magnitude a single instance can output. A blend is held to it.
    const PEAK: f32;

    fn prepare(&mut self, sample_rate: f32);

    fn reset(&mut self);

    /// Whether these settings lock the generator to the host playhead.
    fn follows_transport(params: &Self::Params) -> bool;

    /// Whether moving from `old` to `new` would make the output jump.
    fn needs_fade(old: &Self::Params, new: &Self::Params) -> bool;

    /// Takes over running state from `source`, then realigns to the playhead
    /// when `params` ask for it. Returns whether the phase was realigned.
    fn resync(
        &mut self,
        source: &Self,
        params: &Self::Params,
        transport: &TransportSnapshot,
    ) -> bool;

    /// Writes `ctx.num_samples` frames into both channels of `out`.
    fn render(&mut self, params: &Self::Params, out: &mut ModBuffer, ctx: &BlockContext);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FadeState {
    Idle,
    /// `pending` records a discontinuity that arrived mid-fade.
    Fading { pending: bool },
}

/// Runs a [`FadeCore`] as a pair so that phase resets and structural
/// parameter changes blend over instead of clicking.
#[derive(Debug, Clone)]
pub struct Crossfaded<C: FadeCore> {
    cores: [C; 2],
    params: [C::Params; 2],
    target: C::Params,
    crossfade: Crossfade,
    state: FadeState,
    tracker: PlayheadTracker,
    primed: bool,
    retrigger: bool,
    scratch: ModBuffer,
    fade_in: Vec<f32>,
    fade_out: Vec<f32>,
}

impl<C: FadeCore> Crossfaded<C> {
    pub fn new(core: C, params: C::Params, crossfade_ms: f32) -> Self {
        Self {
            cores: [core.clone(), core],
            params: [params; 2],
            target: params,
            crossfade: Crossfade::new(crossfade_ms),
            state: FadeState::Idle,
            tracker: PlayheadTracker::new(),
            primed: false,
            retrigger: false,
            scratch: ModBuffer::new(0),
            fade_in: Vec::new(),
            fade_out: Vec::new(),
        }
    }

    pub fn state(&self) -> FadeState {
        self.state
    }

    pub fn is_fading(&self) -> bool {
        matches!(self.state, FadeState::Fading { .. })
    }

    pub fn live_core(&self) -> &C {
        &self.cores[self.crossfade.live()]
    }

    /// Applies `f` to both instances, e.g. to swap a shared table.
    pub fn for_each_core(&mut self, mut f: impl FnMut(&mut C)) {
        for core in &mut self.cores {
            f(core);
        }
    }

    fn capacity(&self) -> usize {
        self.scratch.len().min(self.fade_in.len())
    }

    fn start_fade(&mut self, transport: &TransportSnapshot) {
        let new = self.crossfade.outgoing();
        let [a, b] = &mut self.cores;
        let (incoming, outgoing) = if new == 0 { (a, &*b) } else { (b, &*a) };
        // a core that kept its phase stays correlated with the one it replaces
        let curve = if incoming.resync(outgoing, &self.target, transport) {
            FadeCurve::EqualPower
        } else {
            FadeCurve::Complementary
        };
        self.crossfade.init(curve);
        self.params[new] = self.target;
        self.state = FadeState::Fading { pending: false };
        self.retrigger = false;
    }

    fn prime(&mut self, transport: &TransportSnapshot) {
        let live = self.crossfade.live();
        let source = self.cores[live].clone();
        self.cores[live].resync(&source, &self.target, transport);
        self.params[live] = self.target;
        self.primed = true;
    }
}

impl<C: FadeCore> ModGenerator for Crossfaded<C> {
    type Params = C::Params;

    fn prepare(&mut self, sample_rate: f32, max_block: usize, _latency_samples: u32) {
        for core in &mut self.cores {
            core.prepare(sample_rate);
        }
        self.crossfade.prepare(sample_rate);
        self.scratch.resize(max_block);
        self.fade_in.resize(max_block, 0.0);
        self.fade_out.resize(max_block, 0.0);
    }

    fn set_parameters(&mut self, params: &Self::Params) {
        self.target = *params;
    }

    fn process(&mut self, output: &mut ModBuffer, ctx: &BlockContext) {
        let n = ctx.num_samples.min(self.capacity()).min(output.len());
        if n == 0 {
            return;
        }
        let ctx = BlockContext {
            num_samples: n,
            ..*ctx
        };
        let transport = ctx.transport;
        let event = self.tracker.observe(transport, n);

        if !self.primed {
            self.prime(transport);
        } else {
            let live = self.crossfade.live();
            let jumped = event != TransportEvent::None && C::follows_transport(&self.target);
            let changed = C::needs_fade(&self.params[live], &self.target);

            if changed || jumped || self.retrigger {
                match self.state {
                    FadeState::Idle => {
                        trace!("crossfade start: {event:?}, params changed: {changed}");
                        self.start_fade(transport);
                        trace!("crossfade curve: {:?}", self.crossfade.curve());
                    }
                    FadeState::Fading { .. } => {
                        self.state = FadeState::Fading { pending: true };
                    }
                }
            } else {
                self.params[live] = self.target;
            }
        }

        let live = self.crossfade.live();
        self.cores[live].render(&self.params[live], output, &ctx);

        if let FadeState::Fading { pending } = self.state {
            let old = self.crossfade.outgoing();
            self.cores[old].render(&self.params[old], &mut self.scratch, &ctx);
            self.crossfade
                .synthesize(&mut self.fade_in[..n], &mut self.fade_out[..n]);
            for ch in 0..crate::audio::CHANNELS {
                crossfade_buffers(
                    &mut output.channel_mut(ch)[..n],
                    &self.scratch.channel(ch)[..n],
                    &self.fade_in[..n],
                    &self.fade_out[..n],
                );
                for sample in &mut output.channel_mut(ch)[..n] {
                    *sample = sample.clamp(-C::PEAK, C::PEAK);
                }
            }
            if self.crossfade.is_complete() {
                self.state = FadeState::Idle;
                self.retrigger = pending;
            }
        }

        output.sanitize(n);
    }

    fn reset(&mut self) {
        for core in &mut self.cores {
            core.reset();
        }
        self.crossfade.finish();
        self.state = FadeState::Idle;
        self.tracker.reset();
        self.primed = false;
        self.retrigger = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::HostTransport;

    /// Outputs its level while keeping a running sample count as "phase".
    #[derive(Debug, Clone, Default)]
    struct Level {
        count: u64,
        resyncs: u32,
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct LevelParams {
        level: f32,
        synced: bool,
    }

    impl FadeCore for Level {
        type Params = LevelParams;

        const PEAK: f32 = 1.0;

        fn prepare(&mut self, _sample_rate: f32) {}

        fn reset(&mut self) {
            self.count = 0;
        }

        fn follows_transport(params: &LevelParams) -> bool {
            params.synced
        }

        fn needs_fade(old: &LevelParams, new: &LevelParams) -> bool {
            old.level != new.level || old.synced != new.synced
        }

        fn resync(
            &mut self,
            source: &Self,
            params: &LevelParams,
            transport: &TransportSnapshot,
        ) -> bool {
            self.count = source.count;
            self.resyncs = source.resyncs + 1;
            params.synced && transport.is_locked()
        }

        fn render(&mut self, params: &LevelParams, out: &mut ModBuffer, ctx: &BlockContext) {
            let (left, right) = out.channels_mut();
            left[..ctx.num_samples].fill(params.level);
            right[..ctx.num_samples].fill(-params.level);
            self.count += ctx.num_samples as u64;
        }
    }

    const BLOCK: usize = 64;

    fn generator(level: f32, synced: bool) -> Crossfaded<Level> {
        let mut g = Crossfaded::new(Level::default(), LevelParams { level, synced }, 2.0);
        // 2 ms at 64 kHz is two blocks of 64
        g.prepare(64_000.0, BLOCK, 0);
        g
    }

    fn run(g: &mut Crossfaded<Level>, transport: &TransportSnapshot) -> ModBuffer {
        let mut out = ModBuffer::new(BLOCK);
        let ctx = BlockContext::new(transport, BLOCK);
        g.process(&mut out, &ctx);
        out
    }

    #[test]
    fn first_block_starts_without_a_fade() {
        let mut g = generator(0.5, false);
        let out = run(&mut g, &TransportSnapshot::free_running(64_000.0));
        assert_eq!(g.state(), FadeState::Idle);
        assert!(out.channel(0).iter().all(|&s| s == 0.5));
        assert_eq!(g.live_core().resyncs, 1);
    }

    #[test]
    fn structural_change_glides_between_levels() {
        let transport = TransportSnapshot::free_running(64_000.0);
        let mut g = generator(0.0, false);
        run(&mut g, &transport);

        g.set_parameters(&LevelParams {
            level: 1.0,
            synced: false,
        });
        let first = run(&mut g, &transport);
        assert!(g.is_fading());
        assert_eq!(first.channel(0)[0], 0.0);
        assert!(first.channel(0).windows(2).all(|w| w[1] >= w[0]));

        let second = run(&mut g, &transport);
        assert_eq!(g.state(), FadeState::Idle);
        assert!((second.channel(0)[BLOCK - 1] - 1.0).abs() < 1e-3);
        assert!((second.channel(1)[BLOCK - 1] + 1.0).abs() < 1e-3);

        let settled = run(&mut g, &transport);
        assert!(settled.channel(0).iter().all(|&s| s == 1.0));
    }

    #[test]
    fn incoming_core_inherits_running_state() {
        let transport = TransportSnapshot::free_running(64_000.0);
        let mut g = generator(0.0, false);
        run(&mut g, &transport);
        run(&mut g, &transport);
        g.set_parameters(&LevelParams {
            level: 0.3,
            synced: false,
        });
        run(&mut g, &transport);
        // two blocks before the switch plus the first faded block
        assert_eq!(g.live_core().count, 3 * BLOCK as u64);
    }

    #[test]
    fn change_during_fade_is_served_after_it() {
        let transport = TransportSnapshot::free_running(64_000.0);
        let mut g = generator(0.0, false);
        run(&mut g, &transport);

        g.set_parameters(&LevelParams {
            level: 1.0,
            synced: false,
        });
        run(&mut g, &transport);
        g.set_parameters(&LevelParams {
            level: 0.25,
            synced: false,
        });
        run(&mut g, &transport);
        assert_eq!(g.state(), FadeState::Idle);
        let out = run(&mut g, &transport);
        assert!(g.is_fading());
        assert_eq!(out.channel(0)[0], 1.0);
        run(&mut g, &transport);
        let settled = run(&mut g, &transport);
        assert!(settled.channel(0).iter().all(|&s| s == 0.25));
    }

    #[test]
    fn playhead_jump_fades_only_synced_generators() {
        let at = |ppq: f64| {
            let host = HostTransport {
                bpm: Some(120.0),
                ppq_position: Some(ppq),
                is_playing: true,
                ..Default::default()
            };
            TransportSnapshot::from_host(Some(&host), 64_000.0, 0)
        };

        let mut free = generator(0.5, false);
        let mut synced = generator(0.5, true);
        for g in [&mut free, &mut synced] {
            run(g, &at(0.0));
            run(g, &at(0.0).advanced(BLOCK));
            run(g, &at(16.0));
        }
        assert_eq!(free.state(), FadeState::Idle);
        assert!(synced.is_fading());
    }

    #[test]
    fn fade_curve_follows_the_resync() {
        let transport = TransportSnapshot::free_running(64_000.0);
        let mut g = generator(0.5, false);
        run(&mut g, &transport);
        g.set_parameters(&LevelParams {
            level: 0.25,
            synced: false,
        });
        let out = run(&mut g, &transport);
        assert_eq!(g.crossfade.curve(), FadeCurve::Complementary);
        assert!(out
            .channel(0)
            .iter()
            .all(|&s| (0.25 - 1e-6..=0.5 + 1e-6).contains(&s)));

        let host = HostTransport {
            bpm: Some(120.0),
            ppq_position: Some(0.0),
            is_playing: true,
            ..Default::default()
        };
        let locked = TransportSnapshot::from_host(Some(&host), 64_000.0, 0);
        let mut g = generator(0.5, true);
        run(&mut g, &locked);
        run(&mut g, &locked.advanced(BLOCK));
        g.set_parameters(&LevelParams {
            level: 0.25,
            synced: true,
        });
        run(&mut g, &locked.advanced(2 * BLOCK));
        assert_eq!(g.crossfade.curve(), FadeCurve::EqualPower);
    }

    #[test]
    fn blend_is_held_to_the_core_peak() {
        let transport = TransportSnapshot::free_running(64_000.0);
        let mut g = generator(0.9, false);
        run(&mut g, &transport);
        // the swelling law on a correlated pair
        let loud = LevelParams {
            level: 1.0,
            synced: false,
        };
        g.crossfade.init(FadeCurve::EqualPower);
        g.params[g.crossfade.live()] = loud;
        g.target = loud;
        g.state = FadeState::Fading { pending: false };
        let out = run(&mut g, &transport);
        assert!(out.channel(0).iter().any(|&s| s == 1.0));
        assert!(out.channel(0).iter().all(|&s| s <= 1.0));
        assert!(out.channel(1).iter().all(|&s| s >= -1.0));
    }

    #[test]
    fn reset_returns_to_the_unprimed_state() {
        let transport = TransportSnapshot::free_running(64_000.0);
        let mut g = generator(0.0, false);
        run(&mut g, &transport);
        g.set_parameters(&LevelParams {
            level: 1.0,
            synced: false,
        });
        run(&mut g, &transport);
        g.reset();
        assert_eq!(g.state(), FadeState::Idle);
        let out = run(&mut g, &transport);
        assert_eq!(g.state(), FadeState::Idle);
        assert!(out.channel(0).iter().all(|&s| s == 1.0));
    }
}
