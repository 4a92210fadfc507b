//! Victory resolution schedule
//!
//! After a won battle the round waits, fades to black, clears and unlocks
//! the board, respawns the saved heroes one by one and fades back in. The
//! schedule is a plain state machine advanced by elapsed time; it only
//! tells its owner what to do and never touches the board itself.
//!
//! Time left over when a step finishes carries into the next step, so the
//! sequence takes the same simulated time however the frames are sliced.

use crate::battle::events::FadeDirection;
use crate::core::config::RoundConfig;
use crate::core::types::Seconds;

/// Current step of the resolution sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolutionStep {
    VictoryDelay { remaining: Seconds },
    AwaitFade { direction: FadeDirection, waited: Seconds },
    Settle { remaining: Seconds },
    /// `next` heroes have been respawned; wait `remaining` before the next
    Respawning { next: usize, remaining: Seconds },
    PostRespawn { remaining: Seconds },
    Done,
}

/// Something the owner of the schedule must carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionAction {
    RequestFade(FadeDirection),
    /// A fade was not confirmed in time; the sequence moved on anyway
    FadeTimedOut(FadeDirection),
    /// Empty the board and unlock placement
    ClearBoard,
    /// Respawn the saved hero at this index
    Respawn(usize),
    Finished,
}

#[derive(Debug, Clone)]
pub struct ResolutionSchedule {
    step: ResolutionStep,
    config: RoundConfig,
    hero_count: usize,
    fade_confirmed: bool,
    board_cleared: bool,
}

impl ResolutionSchedule {
    pub fn new(config: RoundConfig, hero_count: usize) -> Self {
        Self {
            step: ResolutionStep::VictoryDelay {
                remaining: config.victory_delay,
            },
            config,
            hero_count,
            fade_confirmed: false,
            board_cleared: false,
        }
    }

    pub fn step(&self) -> ResolutionStep {
        self.step
    }

    pub fn is_done(&self) -> bool {
        self.step == ResolutionStep::Done
    }

    /// Fade currently being waited on, if any
    pub fn awaiting_fade(&self) -> Option<FadeDirection> {
        match self.step {
            ResolutionStep::AwaitFade { direction, .. } => Some(direction),
            _ => None,
        }
    }

    /// Confirm that the pending fade finished; false if none was pending
    pub fn complete_fade(&mut self) -> bool {
        if self.awaiting_fade().is_some() {
            self.fade_confirmed = true;
            true
        } else {
            false
        }
    }

    /// Advance by `dt`, returning the actions that fell due, in order
    pub fn advance(&mut self, dt: Seconds) -> Vec<ResolutionAction> {
        let mut actions = Vec::new();
        let mut budget = dt.max(0.0);

        loop {
            match self.step {
                ResolutionStep::VictoryDelay { remaining } => {
                    if budget < remaining {
                        self.step = ResolutionStep::VictoryDelay {
                            remaining: remaining - budget,
                        };
                        break;
                    }
                    budget -= remaining;
                    self.begin_fade(FadeDirection::ToBlack, &mut actions);
                }
                ResolutionStep::AwaitFade { direction, waited } => {
                    if self.fade_confirmed {
                        self.fade_confirmed = false;
                        self.after_fade(direction, &mut actions);
                        continue;
                    }

                    let waited = waited + budget;
                    match self.config.fade_timeout {
                        Some(timeout) if waited >= timeout => {
                            budget = waited - timeout;
                            actions.push(ResolutionAction::FadeTimedOut(direction));
                            self.after_fade(direction, &mut actions);
                        }
                        _ => {
                            self.step = ResolutionStep::AwaitFade { direction, waited };
                            break;
                        }
                    }
                }
                ResolutionStep::Settle { remaining } => {
                    if budget < remaining {
                        self.step = ResolutionStep::Settle {
                            remaining: remaining - budget,
                        };
                        break;
                    }
                    budget -= remaining;
                    self.step = ResolutionStep::Respawning {
                        next: 0,
                        remaining: 0.0,
                    };
                }
                ResolutionStep::Respawning { next, remaining } => {
                    if budget < remaining {
                        self.step = ResolutionStep::Respawning {
                            next,
                            remaining: remaining - budget,
                        };
                        break;
                    }
                    budget -= remaining;
                    if next < self.hero_count {
                        actions.push(ResolutionAction::Respawn(next));
                        self.step = ResolutionStep::Respawning {
                            next: next + 1,
                            remaining: self.config.respawn_delay,
                        };
                    } else {
                        self.step = ResolutionStep::PostRespawn {
                            remaining: self.config.post_respawn_delay,
                        };
                    }
                }
                ResolutionStep::PostRespawn { remaining } => {
                    if budget < remaining {
                        self.step = ResolutionStep::PostRespawn {
                            remaining: remaining - budget,
                        };
                        break;
                    }
                    budget -= remaining;
                    self.begin_fade(FadeDirection::FromBlack, &mut actions);
                }
                ResolutionStep::Done => break,
            }
        }

        actions
    }

    /// Skip the remaining waits, returning the actions still owed
    ///
    /// A screen left black is asked to fade back in without waiting.
    pub fn fast_forward(&mut self) -> Vec<ResolutionAction> {
        let mut actions = Vec::new();

        let fade_back = self.config.fade_enabled
            && matches!(
                self.step,
                ResolutionStep::AwaitFade {
                    direction: FadeDirection::ToBlack,
                    ..
                } | ResolutionStep::Settle { .. }
                    | ResolutionStep::Respawning { .. }
                    | ResolutionStep::PostRespawn { .. }
            );

        if !self.board_cleared {
            actions.push(ResolutionAction::ClearBoard);
            self.board_cleared = true;
        }

        let first_unspawned = match self.step {
            ResolutionStep::Respawning { next, .. } => next,
            ResolutionStep::PostRespawn { .. }
            | ResolutionStep::AwaitFade {
                direction: FadeDirection::FromBlack,
                ..
            }
            | ResolutionStep::Done => self.hero_count,
            _ => 0,
        };
        actions.extend((first_unspawned..self.hero_count).map(ResolutionAction::Respawn));

        if fade_back {
            actions.push(ResolutionAction::RequestFade(FadeDirection::FromBlack));
        }

        if !self.is_done() {
            actions.push(ResolutionAction::Finished);
        }
        self.step = ResolutionStep::Done;
        actions
    }

    fn begin_fade(&mut self, direction: FadeDirection, actions: &mut Vec<ResolutionAction>) {
        if self.config.fade_enabled {
            actions.push(ResolutionAction::RequestFade(direction));
            self.fade_confirmed = false;
            self.step = ResolutionStep::AwaitFade {
                direction,
                waited: 0.0,
            };
        } else {
            self.after_fade(direction, actions);
        }
    }

    fn after_fade(&mut self, direction: FadeDirection, actions: &mut Vec<ResolutionAction>) {
        match direction {
            FadeDirection::ToBlack => {
                actions.push(ResolutionAction::ClearBoard);
                self.board_cleared = true;
                self.step = ResolutionStep::Settle {
                    remaining: self.config.settle_delay,
                };
            }
            FadeDirection::FromBlack => {
                actions.push(ResolutionAction::Finished);
                self.step = ResolutionStep::Done;
            }
        }
    }
}
