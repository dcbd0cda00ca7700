//! Frame-driven photon transit animation for the quantum channel panel.
//!
//! The animator owns play state and a bit/basis source sequence taken from
//! the latest simulation result. It never draws: each frame it yields up to
//! eight photon markers with a transit progress in `[0, 1)`, a sinusoidal
//! vertical offset, the bit value (color) and the basis (stroke angle).
//! Placement is fully deterministic given `(frame, photon_index, bit,
//! basis)`; when the source sequence is exhausted or absent a seeded
//! pseudo-random stream keeps the channel populated.

use crate::result::SimulationResult;

/// Frames per animation cycle.
pub const TOTAL_FRAMES: u32 = 120;

/// Full cycles played before the animator stops on its own.
pub const MAX_CYCLES: u32 = 3;

/// Photons concurrently in transit.
pub const PHOTON_COUNT: usize = 8;

/// Frame stagger between consecutive photons.
pub const PHOTON_SPACING: u32 = 15;

/// Peak vertical offset of the transit wave.
pub const WAVE_AMPLITUDE: f64 = 20.0;

/// Full sine periods across one transit.
pub const WAVE_PERIODS: f64 = 4.0;

/// Measurement basis of a traveling photon.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Basis {
    /// `+` — rendered as a 0° stroke.
    Rectilinear,
    /// `x` — rendered as a 45° stroke.
    Diagonal,
}

impl Basis {
    pub fn from_symbol(c: char) -> Self {
        if c == 'x' { Self::Diagonal } else { Self::Rectilinear }
    }

    pub fn angle_degrees(self) -> u32 {
        match self {
            Self::Rectilinear => 0,
            Self::Diagonal => 45,
        }
    }
}

/// One photon marker for the current frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Photon {
    pub index: usize,
    /// Transit progress from sender (0) to receiver (1), exclusive.
    pub progress: f64,
    /// Vertical wave offset in `[-WAVE_AMPLITUDE, WAVE_AMPLITUDE]`.
    pub offset: f64,
    pub bit: u8,
    pub basis: Basis,
}

/// Play state, mutated only by the animator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationState {
    pub is_playing: bool,
    pub current_frame: u32,
    pub total_frames: u32,
}

impl Default for AnimationState {
    fn default() -> Self {
        Self {
            is_playing: false,
            current_frame: 0,
            total_frames: TOTAL_FRAMES,
        }
    }
}

/// Idle → Playing → Paused state machine over a bit/basis source sequence.
#[derive(Debug, Clone)]
pub struct ChannelAnimator {
    state: AnimationState,
    bits: Vec<u8>,
    bases: Vec<Basis>,
    cycles_done: u32,
    seed: u64,
}

impl Default for ChannelAnimator {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelAnimator {
    pub fn new() -> Self {
        Self {
            state: AnimationState::default(),
            bits: Vec::new(),
            bases: Vec::new(),
            cycles_done: 0,
            seed: 0x9e37_79b9_7f4a_7c15,
        }
    }

    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Reseed the bit/basis source from a simulation result.
    ///
    /// Play state is untouched; the cycle budget is re-armed so fresh data
    /// replays even after an implicit stop.
    pub fn set_data(&mut self, result: &SimulationResult) {
        self.bits = result
            .alice_bits
            .chars()
            .map(|c| if c == '1' { 1 } else { 0 })
            .collect();
        self.bases = result.alice_bases.chars().map(Basis::from_symbol).collect();
        self.cycles_done = 0;
    }

    /// Idle/Paused → Playing.
    pub fn play(&mut self) {
        self.state.is_playing = true;
    }

    /// Playing → Paused; `current_frame` freezes in place.
    pub fn pause(&mut self) {
        self.state.is_playing = false;
    }

    /// Any state → Idle at frame zero with a fresh cycle budget.
    pub fn reset(&mut self) {
        self.state = AnimationState::default();
        self.cycles_done = 0;
    }

    /// Advance one frame if playing. Stops on its own after [`MAX_CYCLES`]
    /// full cycles. Returns whether the animator is still playing.
    pub fn advance(&mut self) -> bool {
        if !self.state.is_playing {
            return false;
        }
        self.state.current_frame += 1;
        if self.state.current_frame >= self.state.total_frames {
            self.state.current_frame = 0;
            self.cycles_done += 1;
            if self.cycles_done >= MAX_CYCLES {
                self.state.is_playing = false;
            }
        }
        self.state.is_playing
    }

    /// Photon markers for the current frame.
    pub fn photons(&self) -> Vec<Photon> {
        self.photons_at(self.state.current_frame)
    }

    /// Photon markers for an arbitrary frame. Deterministic: the same frame
    /// and source data always produce the same markers.
    pub fn photons_at(&self, frame: u32) -> Vec<Photon> {
        (0..PHOTON_COUNT)
            .map(|i| {
                let phase = (frame + i as u32 * PHOTON_SPACING) % self.state.total_frames;
                let progress = f64::from(phase) / f64::from(self.state.total_frames);
                let offset =
                    WAVE_AMPLITUDE * (progress * WAVE_PERIODS * std::f64::consts::TAU).sin();
                let (bit, basis) = self.source_at(i);
                Photon {
                    index: i,
                    progress,
                    offset,
                    bit,
                    basis,
                }
            })
            .collect()
    }

    /// Bit/basis for photon `i`, falling back to a seeded pseudo-random
    /// stream past the end of the source data so the channel never empties.
    fn source_at(&self, i: usize) -> (u8, Basis) {
        if i < self.bits.len() {
            let basis = self.bases.get(i).copied().unwrap_or(Basis::Rectilinear);
            return (self.bits[i], basis);
        }
        let h = splitmix64(self.seed ^ i as u64);
        let basis = if h & 2 == 0 {
            Basis::Rectilinear
        } else {
            Basis::Diagonal
        };
        ((h & 1) as u8, basis)
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}
