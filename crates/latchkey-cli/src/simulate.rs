//! Both nodes in one process, wired to the terminal.
//!
//! Keys come from stdin one character at a time; the virtual LCD is redrawn
//! on stdout whenever it changes. Logs go to stderr.

use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use latchkey_hardware::KeypadInput;
use latchkey_hardware::mock::{
    MockAlarm, MockDoorActuator, MockEeprom, MockKeypad, MockKeypadHandle, MockMotionSensor,
    MockMotionSensorHandle,
};
use latchkey_node::{Authority, AuthorityDevices, Frontend, LcdHandle, VirtualLcd};
use latchkey_protocol::{StreamLink, SupervisedLink};

use crate::config::SimulatorConfig;

const KEY_LEGEND: &str =
    "keys: 0-9 digits, # or = enter, + open, - change, m toggle doorway motion, q quit";

pub async fn run(config: SimulatorConfig) -> Result<()> {
    config.validate()?;

    let eeprom = match &config.eeprom_path {
        Some(path) => MockEeprom::load(path)
            .with_context(|| format!("loading EEPROM image {}", path.display()))?,
        None => MockEeprom::new(),
    };

    let (front_link, back_link) = StreamLink::pair();

    let (door, _door_handle) = MockDoorActuator::new();
    let (motion, motion_handle) = MockMotionSensor::new();
    let (alarm, _alarm_handle) = MockAlarm::new();
    let mut authority = Authority::new(
        back_link,
        AuthorityDevices {
            store: eeprom.clone(),
            door,
            motion,
            alarm,
        },
    );

    let (keypad, keys) = MockKeypad::new();
    let (display, lcd) = VirtualLcd::with_geometry(config.geometry());
    let front_link = SupervisedLink::new(front_link, &config.link_config());
    let mut frontend = Frontend::new(front_link, keypad, display);

    eprintln!("{KEY_LEGEND}");
    info!("Simulator started");

    tokio::select! {
        result = authority.run() => {
            if let Err(e) = result {
                warn!("Authority stopped: {}", e);
            }
        }
        result = frontend.run() => {
            if let Err(e) = result {
                warn!("Frontend stopped: {}", e);
            }
        }
        result = read_keys(keys, motion_handle) => result?,
        () = redraw(lcd) => {}
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
    }

    if let Some(path) = &config.eeprom_path {
        eeprom
            .save(path)
            .with_context(|| format!("saving EEPROM image {}", path.display()))?;
        info!("EEPROM saved to {}", path.display());
    }
    Ok(())
}

/// Feed stdin to the keypad until `q` or end of input.
async fn read_keys(keys: MockKeypadHandle, motion: MockMotionSensorHandle) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        for c in line.chars().filter(|c| !c.is_whitespace()) {
            match c {
                'q' | 'Q' => return Ok(()),
                'm' | 'M' => {
                    let present = motion.toggle();
                    info!("Doorway {}", if present { "occupied" } else { "clear" });
                }
                _ => match KeypadInput::from_char(c) {
                    Some(key) => keys.send_input(key).await?,
                    None => warn!("No key for {:?}", c),
                },
            }
        }
    }
    Ok(())
}

async fn redraw(mut lcd: LcdHandle) {
    while lcd.changed().await {
        let mut out = std::io::stdout().lock();
        // A closed stdout only loses the picture.
        let _ = writeln!(out, "{}", lcd.render()).and_then(|()| out.flush());
    }
}
