//! The combining network: movement, the Q selector, the Q panel and
//! the snoop port.
use std::fmt::{self, Display, Formatter};

use tracing::{Level, event};

use base::address::{self, N_Q_PANEL_BOTTOM_UNITS, N_Q_PANEL_TOP_UNITS, ack, sub};
use base::prelude::*;

use crate::error::Fault;
use crate::session::Colossus;

/// Internal signals which can be observed through the snoop port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SnoopTarget {
    /// The raw tape letter, with the stop bit reported in bit 7.
    Z,
    Q,
    Chi,
    Psi,
    /// mu-61's head in bit 1, mu-37's in bit 0.
    Motor,
    /// The counter mask from the Q panel.
    A,
}

impl SnoopTarget {
    pub const fn selector(&self) -> u8 {
        match self {
            SnoopTarget::Z => sub::SNOOP_Z,
            SnoopTarget::Q => sub::SNOOP_Q,
            SnoopTarget::Chi => sub::SNOOP_CHI,
            SnoopTarget::Psi => sub::SNOOP_PSI,
            SnoopTarget::Motor => sub::SNOOP_MOTOR,
            SnoopTarget::A => sub::SNOOP_A,
        }
    }
}

impl Display for SnoopTarget {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str(match self {
            SnoopTarget::Z => "Z",
            SnoopTarget::Q => "Q",
            SnoopTarget::Chi => "chi",
            SnoopTarget::Psi => "psi",
            SnoopTarget::Motor => "motor",
            SnoopTarget::A => "A",
        })
    }
}

/// Q selector configuration bits.
pub mod selector {
    pub const Z: u8 = 0x20;
    pub const DELTA_Z: u8 = 0x10;
    pub const CHI: u8 = 0x08;
    pub const DELTA_CHI: u8 = 0x04;
    pub const PSI: u8 = 0x02;
    pub const DELTA_PSI: u8 = 0x01;
}

impl<T: Transport> Colossus<T> {
    pub fn reset_movement(&mut self) -> Result<(), Fault> {
        self.checked(address::MOVEMENT, sub::MOVEMENT_RESET, ack::MOVEMENT_RESET)
    }

    pub fn move_one_sprocket(&mut self) -> Result<(), Fault> {
        self.checked(address::MOVEMENT, sub::MOVEMENT_MOVE, ack::MOVEMENT_MOVE)
    }

    pub fn reset_q_selector(&mut self) -> Result<(), Fault> {
        self.checked(
            address::Q_SELECTOR_CONTROL,
            sub::Q_SELECTOR_RESET,
            ack::Q_SELECTOR_RESET,
        )
    }

    /// Recompute Q from the letters currently under the heads.
    pub fn enable_q_selector_one_shot(&mut self) -> Result<(), Fault> {
        self.checked(
            address::Q_SELECTOR_CONTROL,
            sub::Q_SELECTOR_ONE_SHOT,
            ack::Q_SELECTOR_ONE_SHOT,
        )
    }

    /// `config` is an OR of the bits in [`selector`].
    pub fn set_q_selector_config(&mut self, config: u8) -> Result<(), Fault> {
        RangeError::check("Q selector configuration", config.into(), 0x40)?;
        self.checked(address::Q_SELECTOR_CONFIG, config, ack::CONFIG)
    }

    pub fn set_q_panel_top_unit(
        &mut self,
        unit: usize,
        cfg: &QPanelTopUnitConfig,
    ) -> Result<(), Fault> {
        RangeError::check("Q panel top unit", unit as u32, N_Q_PANEL_TOP_UNITS as u32)?;
        for (offset, value) in (0u8..).zip(cfg.encode()) {
            self.checked(address::q_panel_top_unit(unit, offset), value, ack::CONFIG)?;
        }
        Ok(())
    }

    pub fn set_q_panel_bottom_unit(
        &mut self,
        unit: usize,
        cfg: &QPanelBottomUnitConfig,
    ) -> Result<(), Fault> {
        RangeError::check(
            "Q panel bottom unit",
            unit as u32,
            N_Q_PANEL_BOTTOM_UNITS as u32,
        )?;
        for (offset, value) in (0u8..).zip(cfg.encode()) {
            self.checked(address::q_panel_bottom_unit(unit, offset), value, ack::CONFIG)?;
        }
        Ok(())
    }

    pub fn set_q_panel_negating(&mut self, cfg: &QPanelNegatingConfig) -> Result<(), Fault> {
        for (offset, value) in (0u8..).zip(cfg.encode()) {
            self.checked(address::Q_PANEL_NEGATING_BASE + offset, value, ack::CONFIG)?;
        }
        Ok(())
    }

    /// Put every Q panel unit into its no-op configuration, in which
    /// every counter counts every sprocket.
    pub fn reset_q_panel(&mut self) -> Result<(), Fault> {
        event!(Level::DEBUG, "resetting Q panel");
        for unit in 0..N_Q_PANEL_TOP_UNITS {
            self.set_q_panel_top_unit(unit, &QPanelTopUnitConfig::default())?;
        }
        for unit in 0..N_Q_PANEL_BOTTOM_UNITS {
            self.set_q_panel_bottom_unit(unit, &QPanelBottomUnitConfig::default())?;
        }
        self.set_q_panel_negating(&QPanelNegatingConfig::default())
    }

    pub fn snoop(&mut self, target: SnoopTarget) -> Result<u8, Fault> {
        self.value(address::SNOOP, target.selector())
    }

    /// Snoop `target` at each of `n` successive sprockets, moving the
    /// tape on after each observation.
    pub fn snoop_sequence(
        &mut self,
        target: SnoopTarget,
        n: usize,
        reset_first: bool,
    ) -> Result<Vec<u8>, Fault> {
        if reset_first {
            self.reset_movement()?;
        }
        (0..n)
            .map(|_| {
                let value = self.snoop(target)?;
                self.move_one_sprocket()?;
                Ok(value)
            })
            .collect()
    }
}
