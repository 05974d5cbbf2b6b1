//! Tally state mapping
//!
//! Maps the switcher's preview/program ids onto the per-camera byte sequence
//! carried by a status frame. Slots are ordered by the camera inputs'
//! position in the switcher's input list; each slot's value is decided by
//! comparing that input's id against the bus ids, so non-contiguous input
//! ids work.

/// On-air state of a single camera
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TallyState {
    /// Not on either bus
    #[default]
    Standby,
    /// Queued on the preview bus
    Preview,
    /// Live on the program bus
    Program,
}

impl TallyState {
    pub const fn byte(self) -> u8 {
        match self {
            Self::Standby => 0,
            Self::Preview => 1,
            Self::Program => 2,
        }
    }

    pub const fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(Self::Standby),
            1 => Some(Self::Preview),
            2 => Some(Self::Program),
            _ => None,
        }
    }
}

/// Compute the tally sequence for the given camera input ids
///
/// `external_ids` must be the ids of the switcher's external inputs in input
/// list order. Program wins when an input sits on both buses.
pub fn compute_status(external_ids: &[u64], preview_id: u64, program_id: u64) -> Vec<TallyState> {
    external_ids
        .iter()
        .map(|&id| {
            if id == program_id {
                TallyState::Program
            } else if id == preview_id {
                TallyState::Preview
            } else {
                TallyState::Standby
            }
        })
        .collect()
}

/// Build a status frame payload: `[count, tally_1..tally_count]`
///
/// The count field is a single byte; the transmitter hardware tracks eight
/// cameras, so real sequences are far below the cap.
pub fn status_payload(tallies: &[TallyState]) -> Vec<u8> {
    let count = tallies.len().min(u8::MAX as usize);
    let mut payload = Vec::with_capacity(count + 1);
    payload.push(count as u8);
    payload.extend(tallies.iter().take(count).map(|t| t.byte()));
    payload
}

/// Parse a status frame payload back into a tally sequence
///
/// Returns `None` when the count byte disagrees with the payload length or a
/// tally byte is out of range.
pub fn parse_status_payload(payload: &[u8]) -> Option<Vec<TallyState>> {
    let (&count, tallies) = payload.split_first()?;
    if tallies.len() != count as usize {
        return None;
    }
    tallies.iter().map(|&b| TallyState::from_byte(b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_preview_and_program() {
        let status = compute_status(&[1, 2, 3], 1, 2);
        assert_eq!(
            status,
            vec![TallyState::Preview, TallyState::Program, TallyState::Standby]
        );
    }

    #[test]
    fn program_wins_over_preview() {
        let status = compute_status(&[1, 2], 2, 2);
        assert_eq!(status, vec![TallyState::Standby, TallyState::Program]);
    }

    #[test]
    fn handles_non_contiguous_ids() {
        let status = compute_status(&[10, 20, 31], 31, 10);
        assert_eq!(
            status,
            vec![TallyState::Program, TallyState::Standby, TallyState::Preview]
        );
    }

    #[test]
    fn empty_input_list_yields_empty_status() {
        assert!(compute_status(&[], 1, 2).is_empty());
    }

    #[test]
    fn payload_carries_count_then_states() {
        let payload = status_payload(&[TallyState::Preview, TallyState::Program]);
        assert_eq!(payload, vec![2, 1, 2]);
        assert_eq!(
            parse_status_payload(&payload),
            Some(vec![TallyState::Preview, TallyState::Program])
        );
    }

    #[test]
    fn parse_rejects_count_mismatch() {
        assert_eq!(parse_status_payload(&[3, 0, 1]), None);
        assert_eq!(parse_status_payload(&[]), None);
    }

    #[test]
    fn parse_rejects_out_of_range_state() {
        assert_eq!(parse_status_payload(&[1, 7]), None);
    }
}
