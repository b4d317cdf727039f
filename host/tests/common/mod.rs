//! Helpers shared by the integration tests.  Each test drives a
//! session against an emulated device over the in-process loopback.
#![allow(dead_code)]

use base::keystream::{ChiGroup, PsiMuGroup};
use base::prelude::*;
use host::Colossus;
use machine::Loopback;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub type Session = Colossus<Loopback>;

pub fn session() -> Session {
    Colossus::new(Loopback::new()).expect("loopback session should start")
}

pub fn random_letters(seed: u64, n: usize, limit: u16) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n).map(|_| rng.random_range(0..limit) as u8).collect()
}

pub fn random_pattern(rng: &mut StdRng, len: usize) -> CamPattern {
    (0..len).map(|_| rng.random::<bool>()).collect()
}

/// A random pattern for every wheel, in bus order.
pub fn random_patterns(seed: u64) -> [CamPattern; N_WHEELS] {
    let mut rng = StdRng::seed_from_u64(seed);
    std::array::from_fn(|i| random_pattern(&mut rng, WHEEL_LENGTHS[i]))
}

pub fn load_all_patterns(s: &mut Session, patterns: &[CamPattern; N_WHEELS]) {
    for (wheel, pattern) in Wheel::all().into_iter().zip(patterns.iter()) {
        s.load_pattern(wheel, pattern).expect("pattern should load");
    }
}

pub fn punch_random_tape(s: &mut Session, n: usize, seed: u64, limit: u16) -> Vec<u8> {
    let letters = random_letters(seed, n, limit);
    s.punch_tape(&letters, true).expect("tape should punch");
    letters
}

fn count_where(letters: &[u8], mask: u8) -> u16 {
    letters.iter().filter(|&&z| z & mask == mask).count() as u16
}

/// Punch a random tape, configure the Q panel so that counters 2, 3
/// and 4 count impulse 5, impulse 4, and both, then run the tape
/// once.  Returns the counts the device should latch.
pub fn establish_sample_counts(s: &mut Session, tape_len: usize) -> [u16; N_COUNTERS] {
    let letters = punch_random_tape(s, tape_len, 42, 32);
    s.reset_q_panel().unwrap();
    s.set_q_panel_top_unit(0, &QPanelTopUnitConfig::new(0x01, 0x01, false, 0x05).unwrap())
        .unwrap();
    s.set_q_panel_top_unit(1, &QPanelTopUnitConfig::new(0x02, 0x02, false, 0x03).unwrap())
        .unwrap();
    s.set_q_selector_config(host::selector::Z).unwrap();
    s.run_tape_once().unwrap();
    let n = tape_len as u16;
    [
        n,
        n,
        count_where(&letters, 0x01),
        count_where(&letters, 0x02),
        count_where(&letters, 0x03),
    ]
}

/// Give every wheel a random setting between 1 and 15.
pub fn establish_sample_stepping_settings(s: &mut Session) -> [u8; N_WHEELS] {
    let mut rng = StdRng::seed_from_u64(42);
    let settings: [u8; N_WHEELS] = std::array::from_fn(|_| rng.random_range(1..16));
    for (wheel, &n) in Wheel::all().into_iter().zip(settings.iter()) {
        s.set_offset(wheel, n.into()).unwrap();
    }
    settings
}

/// The chi and psi letters the wheels should produce, with every
/// wheel at the given setting.
pub fn model_letters(
    patterns: &[CamPattern; N_WHEELS],
    settings: &[usize; N_WHEELS],
    n: usize,
) -> (Vec<u8>, Vec<u8>) {
    let chi_patterns: [CamPattern; 5] = std::array::from_fn(|i| patterns[i].clone());
    let psi_patterns: [CamPattern; 5] = std::array::from_fn(|i| patterns[5 + i].clone());
    let mu_patterns = [patterns[10].clone(), patterns[11].clone()];
    let mut chi_settings = [0; 5];
    chi_settings.copy_from_slice(&settings[..5]);
    let mut psi_mu_settings = [0; 7];
    psi_mu_settings.copy_from_slice(&settings[5..]);
    let chi = ChiGroup::new(&chi_patterns, &chi_settings).expect("chi settings should fit");
    let psi = PsiMuGroup::new(&psi_patterns, &mu_patterns, &psi_mu_settings)
        .expect("psi settings should fit");
    (chi.letters(n), psi.simulate(n))
}
