use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// No AR session.
    #[default]
    Idle,
    /// Surface scanning, placing and manipulating objects.
    Placing,
    /// Walking through the worn object.
    FirstPerson,
    /// Desk viewer for an interior floor model. Excludes an AR session.
    Interior,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeEvent {
    SessionStarted,
    SessionEnded,
    EnterFirstPerson { has_selection: bool },
    ExitFirstPerson,
    EnterInterior,
    ExitInterior,
}

impl Mode {
    /// The state after `event`, or `None` if the event is not legal here.
    pub fn next(self, event: ModeEvent) -> Option<Mode> {
        use Mode::*;
        use ModeEvent::*;

        match (self, event) {
            (_, SessionEnded) => Some(Idle),
            (Idle, SessionStarted) => Some(Placing),
            (Placing, EnterFirstPerson { has_selection: true }) => Some(FirstPerson),
            (FirstPerson, ExitFirstPerson) => Some(Placing),
            (Idle | Placing, EnterInterior) => Some(Interior),
            (Interior, ExitInterior) => Some(Idle),
            _ => None,
        }
    }

    pub fn has_session(self) -> bool {
        matches!(self, Mode::Placing | Mode::FirstPerson)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Mode::Idle => "idle",
            Mode::Placing => "placing",
            Mode::FirstPerson => "first-person",
            Mode::Interior => "interior",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_person_needs_selection() {
        assert_eq!(
            Mode::Placing.next(ModeEvent::EnterFirstPerson { has_selection: false }),
            None
        );
        assert_eq!(
            Mode::Placing.next(ModeEvent::EnterFirstPerson { has_selection: true }),
            Some(Mode::FirstPerson)
        );
        assert_eq!(
            Mode::Idle.next(ModeEvent::EnterFirstPerson { has_selection: true }),
            None
        );
    }

    #[test]
    fn session_end_always_returns_to_idle() {
        for mode in [Mode::Idle, Mode::Placing, Mode::FirstPerson, Mode::Interior] {
            assert_eq!(mode.next(ModeEvent::SessionEnded), Some(Mode::Idle));
        }
    }

    #[test]
    fn first_person_exits_to_placing() {
        assert_eq!(
            Mode::FirstPerson.next(ModeEvent::ExitFirstPerson),
            Some(Mode::Placing)
        );
        assert_eq!(Mode::Placing.next(ModeEvent::ExitFirstPerson), None);
    }

    #[test]
    fn interior_excludes_first_person() {
        assert_eq!(Mode::FirstPerson.next(ModeEvent::EnterInterior), None);
        assert_eq!(Mode::Placing.next(ModeEvent::EnterInterior), Some(Mode::Interior));
        assert_eq!(Mode::Interior.next(ModeEvent::SessionStarted), None);
        assert_eq!(Mode::Interior.next(ModeEvent::ExitInterior), Some(Mode::Idle));
    }
}
