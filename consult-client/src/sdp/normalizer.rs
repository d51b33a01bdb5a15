use std::collections::BTreeSet;
use tracing::debug;

const EXTMAP_PREFIX: &str = "a=extmap:";

/// First id of the range colliding extension ids are moved into.
pub const RESERVED_EXTMAP_BASE: u16 = 64;
/// Largest id a two-byte RTP header extension can carry.
pub const RESERVED_EXTMAP_MAX: u16 = 255;

/// Moves the header extension mapped at `from` to `to`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtmapRemap {
    pub from: u16,
    pub to: u16,
}

/// Rewrites `a=extmap` ids that different engines are known to assign to
/// different extensions. The table reflects what current engines do and has
/// to follow them when they change.
#[derive(Debug, Clone)]
pub struct SdpNormalizer {
    remaps: Vec<ExtmapRemap>,
}

impl Default for SdpNormalizer {
    fn default() -> Self {
        Self::with_remaps(vec![
            ExtmapRemap {
                from: 13,
                to: RESERVED_EXTMAP_BASE,
            },
            ExtmapRemap {
                from: 14,
                to: RESERVED_EXTMAP_BASE + 1,
            },
        ])
    }
}

impl SdpNormalizer {
    pub fn with_remaps(remaps: Vec<ExtmapRemap>) -> Self {
        Self { remaps }
    }

    /// Returns `sdp` with the configured extension ids remapped. Ids already
    /// taken in `sdp` are never reused; line endings are kept as they are.
    pub fn normalize(&self, sdp: &str) -> String {
        let used: BTreeSet<u16> = sdp
            .lines()
            .filter_map(|line| parse_extmap(line).map(|(id, _)| id))
            .collect();

        let mapping = self.plan(&used);
        if mapping.is_empty() {
            return sdp.to_owned();
        }
        debug!("Remapping SDP header extensions: {:?}", mapping);

        let mut out = String::with_capacity(sdp.len() + 8);
        for raw in sdp.split_inclusive('\n') {
            let body = raw.trim_end_matches(['\r', '\n']);
            let ending = &raw[body.len()..];

            match parse_extmap(body) {
                Some((id, rest)) => match mapping.iter().find(|(from, _)| *from == id) {
                    Some((_, to)) => {
                        out.push_str(EXTMAP_PREFIX);
                        out.push_str(&to.to_string());
                        out.push_str(rest);
                    }
                    None => out.push_str(body),
                },
                None => out.push_str(body),
            }
            out.push_str(ending);
        }
        out
    }

    fn plan(&self, used: &BTreeSet<u16>) -> Vec<(u16, u16)> {
        let mut mapping: Vec<(u16, u16)> = Vec::new();

        for remap in &self.remaps {
            if !used.contains(&remap.from) {
                continue;
            }

            let taken = |id: u16| used.contains(&id) || mapping.iter().any(|(_, to)| *to == id);
            let target = (remap.to..=RESERVED_EXTMAP_MAX).find(|id| !taken(*id));

            match target {
                Some(to) => mapping.push((remap.from, to)),
                None => debug!("No free extension id for {}, leaving it as is", remap.from),
            }
        }

        mapping
    }
}

/// Splits `a=extmap:<id>[/<dir>] <uri>` into the id and everything after it.
fn parse_extmap(line: &str) -> Option<(u16, &str)> {
    let rest = line.strip_prefix(EXTMAP_PREFIX)?;
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let (id, tail) = rest.split_at(digits);
    if !(tail.starts_with('/') || tail.starts_with(' ')) {
        return None;
    }
    Some((id.parse().ok()?, tail))
}
