//! Household whereabouts: ETA countdowns, split plans and contact tracking.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::constants::{AWAY_ETA_RANGE, UNKNOWN_ETA_RANGE};
use crate::scenario::{Location, Role, RosterEntry};
use crate::signals::mentions_contact;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyMember {
    pub name: String,
    pub role: Role,
    pub location: Location,
    #[serde(default)]
    pub contacted: bool,
}

impl From<&RosterEntry> for FamilyMember {
    fn from(entry: &RosterEntry) -> Self {
        Self {
            name: entry.name.clone(),
            role: entry.role,
            location: entry.location,
            contacted: entry.role == Role::Player,
        }
    }
}

impl FamilyMember {
    /// Away and unknown members are the only ones with a return countdown.
    #[must_use]
    pub const fn awaiting_return(&self) -> bool {
        matches!(self.location, Location::Away | Location::Unknown)
    }
}

/// Permanent diversion for a member who could not make it home.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitPlan {
    NearShelter,
}

pub type ReturnEtas = BTreeMap<String, u32>;
pub type SplitPlans = BTreeMap<String, SplitPlan>;

/// Whereabouts snapshot owned by the game state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyUpdate {
    pub family: Vec<FamilyMember>,
    pub return_etas: ReturnEtas,
    pub split_plans: SplitPlans,
}

/// Step every countdown by one turn.
///
/// `alerts_active` diverts members whose countdown finishes into a split plan
/// instead of letting them walk home.
pub fn advance_family<R: Rng + ?Sized>(
    family: &[FamilyMember],
    return_etas: &ReturnEtas,
    split_plans: &SplitPlans,
    alerts_active: bool,
    rng: &mut R,
) -> FamilyUpdate {
    let mut next = FamilyUpdate {
        family: family.to_vec(),
        return_etas: return_etas.clone(),
        split_plans: split_plans.clone(),
    };

    for member in &mut next.family {
        if !member.awaiting_return() || next.split_plans.contains_key(&member.name) {
            next.return_etas.remove(&member.name);
            continue;
        }
        let Some(eta) = next.return_etas.get(&member.name).copied() else {
            let (low, high) = if member.location == Location::Away {
                AWAY_ETA_RANGE
            } else {
                UNKNOWN_ETA_RANGE
            };
            next.return_etas
                .insert(member.name.clone(), rng.gen_range(low..=high));
            continue;
        };
        let remaining = eta.saturating_sub(1);
        if remaining > 0 {
            next.return_etas.insert(member.name.clone(), remaining);
            continue;
        }
        next.return_etas.remove(&member.name);
        if alerts_active {
            member.location = Location::Arrived;
            next.split_plans
                .insert(member.name.clone(), SplitPlan::NearShelter);
            log::debug!("{} sheltered near their location", member.name);
        } else {
            member.location = Location::Home;
            log::debug!("{} made it home", member.name);
        }
    }
    next
}

/// Mark members named in `text` as contacted, promoting unknown to away.
///
/// Returns the names that were contacted.
pub fn register_contact(family: &mut [FamilyMember], text: &str) -> Vec<String> {
    let mut contacted = Vec::new();
    for member in family.iter_mut() {
        if member.role == Role::Player || !mentions_contact(text, &member.name) {
            continue;
        }
        member.contacted = true;
        if member.location == Location::Unknown {
            member.location = Location::Away;
        }
        contacted.push(member.name.clone());
    }
    contacted
}

/// Everyone at home sets out with the evacuation.
pub fn begin_evacuation(family: &mut [FamilyMember]) {
    move_all(family, &[Location::Home], Location::EnRoute);
}

/// The household reaches the shelter; away members join there.
pub fn complete_evacuation(family: &mut [FamilyMember]) {
    move_all(
        family,
        &[Location::Home, Location::EnRoute, Location::Away],
        Location::Arrived,
    );
}

pub fn abort_evacuation(family: &mut [FamilyMember]) {
    move_all(family, &[Location::EnRoute], Location::Home);
}

/// Unresolved whereabouts settle at a phase boundary.
pub fn settle_unknown(family: &mut [FamilyMember], return_etas: &mut ReturnEtas) {
    for member in family.iter_mut() {
        if member.location == Location::Unknown {
            member.location = Location::Home;
            return_etas.remove(&member.name);
        }
    }
}

pub fn mark_disaster(family: &mut [FamilyMember]) {
    for member in family.iter_mut() {
        member.location = Location::Disaster;
    }
}

fn move_all(family: &mut [FamilyMember], from: &[Location], to: Location) {
    for member in family.iter_mut() {
        if from.contains(&member.location) {
            member.location = to;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::mock::StepRng;
    use rand_chacha::ChaCha20Rng;

    fn member(name: &str, role: Role, location: Location) -> FamilyMember {
        FamilyMember {
            name: name.to_string(),
            role,
            location,
            contacted: false,
        }
    }

    #[test]
    fn eta_counts_down_then_leaves_exactly_once() {
        let family = vec![member("Spouse", Role::Spouse, Location::Away)];
        let mut rng = ChaCha20Rng::from_seed([4; 32]);
        let mut update = advance_family(
            &family,
            &ReturnEtas::new(),
            &SplitPlans::new(),
            false,
            &mut rng,
        );
        let mut eta = update.return_etas["Spouse"];
        assert!((AWAY_ETA_RANGE.0..=AWAY_ETA_RANGE.1).contains(&eta));

        let mut exits = 0;
        for _ in 0..10 {
            update = advance_family(
                &update.family,
                &update.return_etas,
                &update.split_plans,
                false,
                &mut rng,
            );
            match update.return_etas.get("Spouse") {
                Some(next) => {
                    assert_eq!(*next, eta - 1);
                    eta = *next;
                }
                None if update.family[0].location == Location::Home && exits == 0 => exits += 1,
                None => {}
            }
        }
        assert_eq!(exits, 1);
        assert_eq!(update.family[0].location, Location::Home);
    }

    #[test]
    fn countdown_under_alerts_diverts_to_shelter() {
        let family = vec![member("Child", Role::Child, Location::Unknown)];
        let etas: ReturnEtas = [(String::from("Child"), 1)].into_iter().collect();
        let update = advance_family(&family, &etas, &SplitPlans::new(), true, &mut StepRng::new(0, 0));
        assert_eq!(update.family[0].location, Location::Arrived);
        assert_eq!(update.split_plans.get("Child"), Some(&SplitPlan::NearShelter));
        assert!(update.return_etas.is_empty());
    }

    #[test]
    fn unknown_eta_uses_wider_range() {
        let family = vec![member("Mother", Role::Elder, Location::Unknown)];
        let update = advance_family(
            &family,
            &ReturnEtas::new(),
            &SplitPlans::new(),
            false,
            &mut StepRng::new(0, 0),
        );
        assert_eq!(update.return_etas["Mother"], UNKNOWN_ETA_RANGE.0);
    }

    #[test]
    fn contact_promotes_unknown_and_ignores_player() {
        let mut family = vec![
            member("You", Role::Player, Location::Home),
            member("Spouse", Role::Spouse, Location::Unknown),
            member("Dog", Role::Pet, Location::Home),
        ];
        let names = register_contact(&mut family, "Call Spouse to check where they are");
        assert_eq!(names, vec!["Spouse"]);
        assert!(family[1].contacted);
        assert_eq!(family[1].location, Location::Away);
        assert!(!family[2].contacted);
    }

    #[test]
    fn evacuation_moves_and_phase_settles_unknown() {
        let mut family = vec![
            member("You", Role::Player, Location::Home),
            member("Spouse", Role::Spouse, Location::Away),
            member("Child", Role::Child, Location::Unknown),
        ];
        begin_evacuation(&mut family);
        assert_eq!(family[0].location, Location::EnRoute);
        assert_eq!(family[1].location, Location::Away);

        let mut etas: ReturnEtas = [(String::from("Child"), 3)].into_iter().collect();
        settle_unknown(&mut family, &mut etas);
        assert_eq!(family[2].location, Location::Home);
        assert!(etas.is_empty());

        abort_evacuation(&mut family);
        assert_eq!(family[0].location, Location::Home);

        complete_evacuation(&mut family);
        assert!(family.iter().all(|m| m.location == Location::Arrived));

        mark_disaster(&mut family);
        assert!(family.iter().all(|m| m.location == Location::Disaster));
    }
}
