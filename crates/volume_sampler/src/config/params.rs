//! Parser for the renderer's flag string.
//!
//! The string is a sequence of `-flag [value]` pairs separated by whitespace. Values may be
//! wrapped in single or double quotes to carry whitespace. Switches take no value.
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::VolumeConfig;
use crate::error::{Error, Result};
use crate::sampling::MergePolicy;
use crate::volume::motion::{ShutterMode, VelocitySpec};

const SWITCHES: [&str; 3] = ["-ignoreXform", "-verbose", "-velocityWorld"];

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    /// Characters up to the next whitespace.
    fn word(&mut self) -> &'a str {
        let rest = self.rest();
        let len = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    /// A bare word or a quoted string. `None` for an unterminated quote.
    fn value(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        match rest.chars().next() {
            Some(q @ ('"' | '\'')) => {
                let close = rest[1..].find(q)?;
                self.pos += close + 2;
                Some(&rest[1..close + 1])
            }
            _ => Some(self.word()),
        }
    }
}

fn parse_number(flag: &str, value: &str) -> Result<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| Error::InvalidConfig(format!("invalid value for {}: {}", flag, value)))
}

/// `"ch=avg,other=max"`; malformed items and unknown policies are skipped with a warning.
pub fn parse_merge_list(spec: &str, into: &mut HashMap<String, MergePolicy>) {
    for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let Some((channel, kind)) = item.split_once('=') else {
            warn!("Ignoring merge item without '=': \"{}\"", item);
            continue;
        };
        match kind.parse::<MergePolicy>() {
            Ok(policy) => {
                debug!("Using {} merge for channel \"{}\"", policy, channel.trim());
                into.insert(channel.trim().to_string(), policy);
            }
            Err(e) => warn!("Ignoring merge item \"{}\": {}", item, e),
        }
    }
}

/// `"vel"` names a vector field, `"vx,vy,vz"` three scalar component fields.
pub fn parse_velocity(value: &str) -> Result<VelocitySpec> {
    let names: Vec<&str> = value.split(',').map(str::trim).collect();
    match names.as_slice() {
        [name] if !name.is_empty() => Ok(VelocitySpec::Vector(name.to_string())),
        [x, y, z] if !x.is_empty() && !y.is_empty() && !z.is_empty() => Ok(
            VelocitySpec::Components([x.to_string(), y.to_string(), z.to_string()]),
        ),
        _ => Err(Error::InvalidConfig(format!(
            "velocity must name one vector field or three scalar fields, got \"{}\"",
            value
        ))),
    }
}

/// Parses `user_string` into a configuration. `frame` is the scene frame, which `-frame`
/// overrides.
pub fn parse(user_string: &str, frame: f64) -> Result<VolumeConfig> {
    let mut config = VolumeConfig {
        frame,
        ..Default::default()
    };
    let mut cursor = Cursor::new(user_string);

    loop {
        cursor.skip_whitespace();
        if cursor.at_end() {
            break;
        }

        if !cursor.rest().starts_with('-') {
            return Err(Error::InvalidConfig(format!(
                "cannot parse \"{}\"",
                cursor.rest()
            )));
        }

        let flag = cursor.word();
        debug!("Flag \"{}\"", flag);

        if SWITCHES.contains(&flag) {
            match flag {
                "-ignoreXform" => config.ignore_transform = true,
                "-verbose" => config.verbose = true,
                _ => config.motion.velocity_in_world_space = true,
            }
            continue;
        }

        cursor.skip_whitespace();
        if cursor.at_end() {
            return Err(Error::InvalidConfig(format!("missing value for {}", flag)));
        }
        let value = cursor
            .value()
            .ok_or_else(|| Error::InvalidConfig(format!("missing value for {}", flag)))?;
        debug!("{} = \"{}\"", &flag[1..], value);

        match flag {
            "-file" => config.path = value.to_string(),
            "-partition" => config.partition = Some(value.to_string()),
            "-merge" => parse_merge_list(value, &mut config.merge),
            "-frame" => config.frame = parse_number(flag, value)?,
            "-velocity" => config.motion.velocity = Some(parse_velocity(value)?),
            "-velocityScale" => config.motion.velocity_scale = parse_number(flag, value)?,
            "-shutter" => config.motion.shutter = value.parse::<ShutterMode>()?,
            "-motionStart" => config.motion.motion_start = parse_number(flag, value)?,
            "-motionEnd" => config.motion.motion_end = parse_number(flag, value)?,
            "-fps" => config.motion.fps = parse_number(flag, value)?,
            _ => return Err(Error::InvalidConfig(format!("invalid flag \"{}\"", flag))),
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_core_flags() {
        let config = parse(
            "-file \"/v/my smoke.<frame:4>.f3d\" -partition 'fluid' -frame 12.5 -ignoreXform -verbose",
            1.0,
        )
        .unwrap();
        assert_eq!(config.path, "/v/my smoke.<frame:4>.f3d");
        assert_eq!(config.partition.as_deref(), Some("fluid"));
        assert_eq!(config.frame, 12.5);
        assert!(config.ignore_transform);
        assert!(config.verbose);
    }

    #[test]
    fn scene_frame_is_the_default() {
        let config = parse("-file a.f3d", 42.0).unwrap();
        assert_eq!(config.frame, 42.0);
        assert!(!config.ignore_transform);
    }

    #[test]
    fn merge_list_skips_bad_items() {
        let config = parse("-merge density=avg,heat=max,bogus,temp=mean,vel=min", 1.0).unwrap();
        assert_eq!(config.merge.len(), 3);
        assert_eq!(config.merge["density"], MergePolicy::Average);
        assert_eq!(config.merge["heat"], MergePolicy::Max);
        assert_eq!(config.merge["vel"], MergePolicy::Min);
    }

    #[test]
    fn motion_flags() {
        let config = parse(
            "-file a.f3d -velocity vx,vy,vz -velocityScale 2 -shutter relative \
             -motionStart -0.5 -motionEnd 0.5 -fps 30 -velocityWorld",
            1.0,
        )
        .unwrap();
        let m = &config.motion;
        assert_eq!(
            m.velocity,
            Some(VelocitySpec::Components([
                "vx".into(),
                "vy".into(),
                "vz".into()
            ]))
        );
        assert_eq!(m.velocity_scale, 2.0);
        assert_eq!(m.shutter, ShutterMode::FrameRelative);
        assert_eq!(m.motion_start, -0.5);
        assert_eq!(m.motion_end, 0.5);
        assert_eq!(m.fps, 30.0);
        assert!(m.velocity_in_world_space);
    }

    #[test]
    fn rejects_malformed_strings() {
        assert!(parse("-file", 1.0).is_err());
        assert!(parse("-file   ", 1.0).is_err());
        assert!(parse("-file \"unterminated", 1.0).is_err());
        assert!(parse("-bogus 1", 1.0).is_err());
        assert!(parse("-file a.f3d trailing", 1.0).is_err());
        assert!(parse("-frame abc", 1.0).is_err());
        assert!(parse("-velocity a,b", 1.0).is_err());
        assert!(parse("-shutter sideways", 1.0).is_err());
    }

    #[test]
    fn empty_string_yields_defaults() {
        let config = parse("  ", 3.0).unwrap();
        assert!(config.path.is_empty());
        assert_eq!(config.frame, 3.0);
    }
}
