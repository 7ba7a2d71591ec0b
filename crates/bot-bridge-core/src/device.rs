//! Virtual joystick state and neutral reset
//!
//! The bridge does not drive joystick hardware itself. Drivers implement
//! [`VirtualJoystick`] and [`reset`] puts any of them back in the neutral
//! position between matches.

use crate::error::Result;
use crate::output::NEUTRAL_AXIS;

/// Raw state of one virtual joystick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JoystickState {
    pub axis_x: i32,
    pub axis_y: i32,
    pub axis_x_rot: i32,
    pub axis_y_rot: i32,
    pub axis_z: i32,
    pub axis_z_rot: i32,
    /// Button bitmask
    pub buttons: u32,
}

impl JoystickState {
    /// Sticks centered, triggers released, no buttons held
    pub const NEUTRAL: JoystickState = JoystickState {
        axis_x: NEUTRAL_AXIS,
        axis_y: NEUTRAL_AXIS,
        axis_x_rot: NEUTRAL_AXIS,
        axis_y_rot: NEUTRAL_AXIS,
        axis_z: 0,
        axis_z_rot: 0,
        buttons: 0,
    };

    /// Axes in driver order: X, Y, X-rot, Y-rot, Z, Z-rot
    pub fn axes(&self) -> [i32; 6] {
        [
            self.axis_x,
            self.axis_y,
            self.axis_x_rot,
            self.axis_y_rot,
            self.axis_z,
            self.axis_z_rot,
        ]
    }
}

/// A virtual joystick device
pub trait VirtualJoystick {
    /// Device id as known to the driver
    fn id(&self) -> u32;

    /// Pending state, applied on the next [`update`](VirtualJoystick::update)
    fn state_mut(&mut self) -> &mut JoystickState;

    /// Commit the pending state to the driver
    fn update(&mut self) -> Result<()>;
}

/// Put a device in the neutral position and commit it
pub fn reset<J: VirtualJoystick + ?Sized>(device: &mut J) -> Result<()> {
    *device.state_mut() = JoystickState::NEUTRAL;
    device.update()
}

/// Reset every device, stopping at the first failure
pub fn reset_all<'a, I>(devices: I) -> Result<()>
where
    I: IntoIterator<Item = &'a mut dyn VirtualJoystick>,
{
    for device in devices {
        reset(device)?;
    }
    Ok(())
}

/// In-process joystick that records every committed state
#[derive(Debug, Clone, Default)]
pub struct MemoryJoystick {
    id: u32,
    pending: JoystickState,
    committed: Vec<JoystickState>,
}

impl MemoryJoystick {
    pub fn new(id: u32) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Last state committed with `update`, if any
    pub fn current(&self) -> Option<&JoystickState> {
        self.committed.last()
    }

    /// Number of committed updates
    pub fn update_count(&self) -> usize {
        self.committed.len()
    }
}

impl VirtualJoystick for MemoryJoystick {
    fn id(&self) -> u32 {
        self.id
    }

    fn state_mut(&mut self) -> &mut JoystickState {
        &mut self.pending
    }

    fn update(&mut self) -> Result<()> {
        self.committed.push(self.pending);
        Ok(())
    }
}
