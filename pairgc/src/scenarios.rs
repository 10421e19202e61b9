//! Canonical collector workloads, run by the `pairgc` binary.

use log::info;
use thiserror::Error;

use crate::{
    CollectionStats, GarbageCollectionStats, GcError, Machine, MachineSettings,
    Object, ObjectRef,
};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Gc(#[from] GcError),
    #[error("{scenario}: expected {expected} live objects, found {found}")]
    Mismatch {
        scenario: &'static str,
        expected: usize,
        found: usize,
    },
}

pub struct Scenario {
    pub name: &'static str,
    /// Live objects expected after the closing collection.
    pub expected: usize,
    build: fn(&mut Machine) -> Result<(), GcError>,
}

pub const SCENARIOS: &[Scenario] = &[
    Scenario {
        name: "objects on stack are preserved",
        expected: 2,
        build: objects_on_stack,
    },
    Scenario {
        name: "unreached objects are collected",
        expected: 0,
        build: unreached_objects,
    },
    Scenario {
        name: "nested objects are reached",
        expected: 7,
        build: nested_objects,
    },
    Scenario {
        name: "rooted cycles are kept",
        expected: 4,
        build: rooted_cycle,
    },
    Scenario {
        name: "unrooted cycles are freed",
        expected: 0,
        build: unrooted_cycle,
    },
];

impl Scenario {
    /// Builds the scenario on a fresh machine, collects and checks the
    /// surviving object count.
    pub fn run(
        &self,
        settings: &MachineSettings,
        dump: bool,
    ) -> Result<CollectionStats, ScenarioError> {
        let mut vm = Machine::with_settings(settings.clone())?;
        (self.build)(&mut vm)?;
        let stats = vm.collect();

        if dump {
            vm.print_roots();
            print!("{}", vm.allocations_to_string());
        }

        if stats.remaining != self.expected {
            return Err(ScenarioError::Mismatch {
                scenario: self.name,
                expected: self.expected,
                found: stats.remaining,
            });
        }
        info!(
            "{}: collected {}, {} remaining",
            self.name, stats.collected, stats.remaining
        );
        Ok(stats)
    }
}

fn objects_on_stack(vm: &mut Machine) -> Result<(), GcError> {
    vm.push_scalar(1)?;
    vm.push_scalar(2)?;
    Ok(())
}

fn unreached_objects(vm: &mut Machine) -> Result<(), GcError> {
    vm.push_scalar(1)?;
    vm.push_scalar(2)?;
    vm.pop_root();
    vm.pop_root();
    Ok(())
}

fn nested_objects(vm: &mut Machine) -> Result<(), GcError> {
    vm.push_scalar(1)?;
    vm.push_scalar(2)?;
    vm.make_pair()?;
    vm.push_scalar(3)?;
    vm.push_scalar(4)?;
    vm.make_pair()?;
    vm.make_pair()?;
    Ok(())
}

/// Two pairs pointing at each other through `second`, both left on the
/// stack. The scalars they originally held in `second` become garbage.
fn build_cycle(vm: &mut Machine) -> Result<(ObjectRef, ObjectRef), GcError> {
    vm.push_scalar(1)?;
    vm.push_scalar(2)?;
    let a = vm.make_pair()?;
    vm.push_scalar(3)?;
    vm.push_scalar(4)?;
    let b = vm.make_pair()?;

    let a_first = first_of(vm, a);
    let b_first = first_of(vm, b);
    vm.heap_mut().set_pair(a, a_first, b);
    vm.heap_mut().set_pair(b, b_first, a);
    Ok((a, b))
}

fn first_of(vm: &Machine, pair: ObjectRef) -> ObjectRef {
    let Some(first) = vm.object(pair).and_then(Object::first) else {
        panic!("{pair} is not a filled pair");
    };
    first
}

fn rooted_cycle(vm: &mut Machine) -> Result<(), GcError> {
    build_cycle(vm)?;
    Ok(())
}

fn unrooted_cycle(vm: &mut Machine) -> Result<(), GcError> {
    build_cycle(vm)?;
    vm.pop_root();
    vm.pop_root();
    Ok(())
}

/// Churns the heap: fills the stack with scalars, folds them into one
/// nested pair and drops it, `iterations` times.
pub fn stress(
    settings: &MachineSettings,
    iterations: usize,
) -> Result<GarbageCollectionStats, GcError> {
    let mut vm = Machine::with_settings(settings.clone())?;
    let batch = vm.roots().capacity().min(20);

    for i in 0..iterations {
        for j in 0..batch {
            vm.push_scalar((i * batch + j) as i64)?;
        }
        while vm.depth() >= 2 {
            vm.make_pair()?;
        }
        vm.pop_root();
    }

    let last = vm.collect();
    info!(
        "stress: {} iterations, {} collections, {} objects remaining",
        iterations,
        vm.stats().collections,
        last.remaining
    );
    Ok(vm.stats())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_scenarios_pass_with_default_settings() {
        let settings = MachineSettings::default();
        for scenario in SCENARIOS {
            if let Err(err) = scenario.run(&settings, false) {
                panic!("{}: {}", scenario.name, err);
            }
        }
    }

    #[test]
    fn all_scenarios_pass_when_collecting_constantly() {
        let settings = MachineSettings {
            initial_threshold: 1,
            growth_factor: 1,
            ..Default::default()
        };
        for scenario in SCENARIOS {
            if let Err(err) = scenario.run(&settings, false) {
                panic!("{}: {}", scenario.name, err);
            }
        }
    }

    #[test]
    fn rooted_cycle_frees_the_displaced_scalars() {
        let stats = SCENARIOS[3]
            .run(&MachineSettings::default(), false)
            .unwrap();
        assert_eq!(stats.collected, 2);
    }

    #[test]
    fn mismatch_is_reported() {
        let scenario = Scenario {
            name: "wrong expectation",
            expected: 1,
            build: objects_on_stack,
        };
        let err = scenario.run(&MachineSettings::default(), false).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Mismatch {
                expected: 1,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn scenario_surfaces_heap_exhaustion() {
        let settings = MachineSettings {
            max_objects: Some(1),
            ..Default::default()
        };
        let err = SCENARIOS[0].run(&settings, false).unwrap_err();
        assert!(matches!(
            err,
            ScenarioError::Gc(GcError::HeapExhausted { live: 1, limit: 1 })
        ));
    }

    #[test]
    fn stress_accounts_for_every_allocation() {
        let stats = stress(&MachineSettings::default(), 50).unwrap();
        // 20 scalars and 19 pairs per iteration
        assert_eq!(stats.allocated, 50 * 39);
        assert_eq!(stats.collected, stats.allocated);
        assert!(stats.collections > 1);
    }

    #[test]
    fn stress_respects_small_stacks() {
        let settings = MachineSettings {
            stack_capacity: 4,
            ..Default::default()
        };
        let stats = stress(&settings, 10).unwrap();
        assert_eq!(stats.allocated, 10 * 7);
    }
}
