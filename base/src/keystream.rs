//! Reference model of the key stream generated by the wheels.
//!
//! Nothing here touches the device.  The device's Q stream (with the
//! selector set to show chi or psi) can be checked against these
//! letters.
//!
//! The chi wheels all advance on every sprocket.  The psi wheels move
//! irregularly, under the control of the two motor wheels:
//!
//! - mu-61 advances on every sprocket;
//! - mu-37 advances when the current cam of mu-61 is raised;
//! - the psi wheels advance when the current cam of mu-37 is raised.
//!
//! The letter emitted for a sprocket is the psi letter seen before
//! that sprocket's movement.
//!
//! [`PsiMuGroup`] computes its letters two ways.
//! [`PsiMuGroup::simulate`] steps the wheels one sprocket at a time;
//! [`PsiMuGroup::closed_form`] instead works out, for each sprocket,
//! how far each wheel has moved from running totals of the controlling
//! wheel's cams.  The two must agree.
use super::error::RangeError;
use super::wheels::{CHI_LENGTHS, CamPattern, MU_LENGTHS, PSI_LENGTHS, Wheel};

/// Assemble a letter from five impulses, impulse 1 most significant.
#[must_use]
pub fn letter_from_impulses(impulses: [bool; 5]) -> u8 {
    impulses
        .iter()
        .fold(0u8, |acc, &bit| (acc << 1) | u8::from(bit))
}

/// A wheel pattern together with its setting.
#[derive(Debug, Clone, PartialEq, Eq)]
struct SetWheel {
    pattern: CamPattern,
    setting: usize,
}

impl SetWheel {
    fn new(wheel: Wheel, pattern: &CamPattern, setting: usize) -> Result<SetWheel, RangeError> {
        pattern.check_fits(wheel)?;
        RangeError::check("wheel setting", setting as u32, wheel.length() as u32)?;
        Ok(SetWheel {
            pattern: pattern.clone(),
            setting,
        })
    }

    /// The cam under the read head after `moves` movements.
    fn cam(&self, moves: usize) -> bool {
        // `new` rejects patterns of the wrong length, so this is never
        // empty.
        self.pattern.cyclic(self.setting + moves).unwrap_or(false)
    }
}

fn letter_at(wheels: &[SetWheel; 5], moves: usize) -> u8 {
    letter_from_impulses([
        wheels[0].cam(moves),
        wheels[1].cam(moves),
        wheels[2].cam(moves),
        wheels[3].cam(moves),
        wheels[4].cam(moves),
    ])
}

fn set_group<const N: usize>(
    make_wheel: fn(usize) -> Result<Wheel, RangeError>,
    patterns: &[CamPattern; N],
    settings: &[usize; N],
) -> Result<[SetWheel; N], RangeError> {
    let mut wheels = Vec::with_capacity(N);
    for (i, (pattern, setting)) in patterns.iter().zip(settings.iter()).enumerate() {
        wheels.push(SetWheel::new(make_wheel(i)?, pattern, *setting)?);
    }
    wheels
        .try_into()
        .map_err(|w: Vec<SetWheel>| RangeError::WrongLength {
            what: "wheel group",
            got: w.len(),
            expected: N,
        })
}

/// The five chi wheels at particular settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChiGroup {
    wheels: [SetWheel; 5],
}

impl ChiGroup {
    pub fn new(
        patterns: &[CamPattern; CHI_LENGTHS.len()],
        settings: &[usize; CHI_LENGTHS.len()],
    ) -> Result<ChiGroup, RangeError> {
        Ok(ChiGroup {
            wheels: set_group(Wheel::chi, patterns, settings)?,
        })
    }

    /// The first `n` chi letters.
    #[must_use]
    pub fn letters(&self, n: usize) -> Vec<u8> {
        (0..n).map(|i| letter_at(&self.wheels, i)).collect()
    }
}

/// The psi wheels and the two motor wheels which drive them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PsiMuGroup {
    psi: [SetWheel; 5],
    mu: [SetWheel; 2],
}

impl PsiMuGroup {
    /// `settings` holds the five psi settings then mu-61 and mu-37.
    pub fn new(
        psi: &[CamPattern; PSI_LENGTHS.len()],
        mu: &[CamPattern; MU_LENGTHS.len()],
        settings: &[usize; PSI_LENGTHS.len() + MU_LENGTHS.len()],
    ) -> Result<PsiMuGroup, RangeError> {
        let mut psi_settings = [0; 5];
        psi_settings.copy_from_slice(&settings[..5]);
        let mu_settings = [settings[5], settings[6]];
        Ok(PsiMuGroup {
            psi: set_group(Wheel::psi, psi, &psi_settings)?,
            mu: set_group(Wheel::mu, mu, &mu_settings)?,
        })
    }

    /// The first `n` psi letters, found by moving the wheels one
    /// sprocket at a time.
    #[must_use]
    pub fn simulate(&self, n: usize) -> Vec<u8> {
        let [mu61, mu37] = &self.mu;
        let (mut psi_moves, mut mu37_moves, mut mu61_moves) = (0, 0, 0);
        let mut letters = Vec::with_capacity(n);
        for _ in 0..n {
            letters.push(letter_at(&self.psi, psi_moves));
            if mu37.cam(mu37_moves) {
                psi_moves += 1;
            }
            if mu61.cam(mu61_moves) {
                mu37_moves += 1;
            }
            mu61_moves += 1;
        }
        letters
    }

    /// The first `n` psi letters, computed from running totals.
    ///
    /// Before sprocket `i`, mu-37 has moved once for each raised cam
    /// among the first `i` cams of mu-61, and the psi wheels have moved
    /// once for each raised cam of mu-37 seen at sprockets `0..i`.
    #[must_use]
    pub fn closed_form(&self, n: usize) -> Vec<u8> {
        let [mu61, mu37] = &self.mu;
        let mu37_moves = running_totals((0..n).map(|i| mu61.cam(i)));
        let extended_mu37 = mu37_moves.map(|moves| mu37.cam(moves));
        running_totals(extended_mu37)
            .map(|psi_moves| letter_at(&self.psi, psi_moves))
            .collect()
    }
}

/// Element `i` of the output is the number of `true` values among the
/// first `i` inputs.
fn running_totals<I>(bits: I) -> impl Iterator<Item = usize>
where
    I: Iterator<Item = bool>,
{
    bits.scan(0usize, |total, bit| {
        let before = *total;
        *total += usize::from(bit);
        Some(before)
    })
}

/// Combine chi and psi letters into key letters.
#[must_use]
pub fn key_letters(chi: &[u8], psi: &[u8]) -> Vec<u8> {
    chi.iter().zip(psi.iter()).map(|(c, p)| c ^ p).collect()
}
