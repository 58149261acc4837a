use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail, ensure};
use randoreq_game::{
    Amount, ResourceDatabase, ResourceKey, ResourceState, ResourceType, SimpleResourceInfo,
};
use randoreq_logic::{IndividualRequirement, RequirementList, RequirementSet};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct ScenarioFile {
    database: ResourceDatabase,
    scenarios: Vec<Scenario>,
}

#[derive(Debug, Deserialize)]
struct Scenario {
    name: String,
    requirement: RequirementSet,
    #[serde(default)]
    state: Vec<ScenarioAmount>,
    // Resources that stay fixed for the run; these are also part of the evaluated state.
    #[serde(default)]
    static_state: Vec<ScenarioAmount>,
    satisfied: Option<bool>,
    simplified: Option<RequirementSet>,
    alternatives: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ScenarioAmount {
    resource: ResourceKey,
    amount: Amount,
}

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn test_scenario(database: &ResourceDatabase, scenario: &Scenario) -> Result<()> {
    for req in scenario.requirement.individual_requirements() {
        ensure!(
            database.contains(req.resource()),
            "unknown resource {}",
            req.resource()
        );
    }

    let static_state: ResourceState = scenario
        .static_state
        .iter()
        .map(|x| (x.resource, x.amount))
        .collect();
    let mut state = static_state.clone();
    state.extend(scenario.state.iter().map(|x| (x.resource, x.amount)));

    if let Some(n) = scenario.alternatives {
        ensure!(
            scenario.requirement.alternatives().len() == n,
            "Expected {} alternatives, got:\n{}",
            n,
            scenario.requirement.display(database)
        );
    }

    let simplified = scenario.requirement.simplify(&static_state, database);
    if let Some(expected) = &scenario.simplified {
        if &simplified != expected {
            bail!(
                "Simplified to:\n{}\nexpected:\n{}",
                simplified.display(database),
                expected.display(database)
            );
        }
    }

    if let Some(expected) = scenario.satisfied {
        ensure!(
            scenario.requirement.satisfied(&state) == expected,
            "Expected satisfied={expected} for state {:?}",
            state.iter().collect::<Vec<_>>()
        );
        ensure!(
            simplified.satisfied(&state) == expected,
            "Simplified formula disagrees with the original:\n{}",
            simplified.display(database)
        );
    }
    Ok(())
}

#[test]
fn test_requirement_scenarios() -> Result<()> {
    init_logging();
    let scenarios_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/scenarios");
    for entry in std::fs::read_dir(&scenarios_dir)? {
        let path = entry?.path();
        println!("{}", path.display());
        let file_str = std::fs::read_to_string(&path)
            .with_context(|| format!("loading {}", path.display()))?;
        let file: ScenarioFile = serde_json::from_str(&file_str)
            .with_context(|| format!("parsing {}", path.display()))?;
        for scenario in &file.scenarios {
            println!("Scenario: {}", scenario.name);
            test_scenario(&file.database, scenario)
                .with_context(|| format!("scenario '{}'", scenario.name))?;
        }
    }
    Ok(())
}

fn database() -> Result<ResourceDatabase> {
    ResourceDatabase::from_json_str(
        r#"{
            "misc": [
                {"index": 0, "long_name": "Trivial", "short_name": "Trivial"},
                {"index": 1, "long_name": "Impossible", "short_name": "Impossible"}
            ]
        }"#,
    )
}

fn make_req(index: usize) -> Result<(ResourceKey, IndividualRequirement)> {
    let resource = SimpleResourceInfo::new(index, "Req", "Req").key(ResourceType::Item);
    Ok((resource, IndividualRequirement::new(resource, 1, false)?))
}

#[test]
fn test_empty_requirement_set() {
    let empty = RequirementSet::new(Vec::<RequirementList>::new());
    assert!(!empty.satisfied(&ResourceState::new()));
}

#[test]
fn test_empty_requirement_list() {
    let empty = RequirementList::new(Vec::<IndividualRequirement>::new());
    assert!(empty.satisfied(&ResourceState::new()));
}

#[test]
fn test_simplify_requirement_set_static() -> Result<()> {
    let database = database()?;
    let (res_a, id_req_a) = make_req(0)?;
    let (res_b, id_req_b) = make_req(1)?;

    let the_set = RequirementSet::new([
        RequirementList::new([id_req_a]),
        RequirementList::new([id_req_b]),
    ]);

    let simple_1 = the_set.simplify(&[(res_a, 0), (res_b, 0)].into_iter().collect(), &database);
    let simple_2 = the_set.simplify(&[(res_a, 0), (res_b, 1)].into_iter().collect(), &database);
    let simple_3 = the_set.simplify(&[(res_a, 1), (res_b, 1)].into_iter().collect(), &database);

    assert_eq!(simple_1, RequirementSet::impossible());
    assert_eq!(simple_2, RequirementSet::trivial());
    assert_eq!(simple_3, RequirementSet::trivial());
    Ok(())
}

#[test]
fn test_trivial_merge() -> Result<()> {
    let trivial = RequirementSet::trivial();
    let impossible = RequirementSet::impossible();
    let (_, id_req_a) = make_req(0)?;

    let the_set = RequirementSet::new([RequirementList::new([id_req_a])]);

    assert_eq!(trivial.merge(&trivial), trivial);
    assert_eq!(trivial.merge(&the_set), the_set);
    assert_eq!(the_set.merge(&trivial), the_set);
    assert_eq!(trivial.merge(&impossible), impossible);
    assert_eq!(impossible.merge(&the_set), impossible);
    assert_eq!(the_set.merge(&impossible), impossible);
    assert_eq!(the_set.merge(&the_set), the_set);
    Ok(())
}

#[test]
fn test_serialized_requirement_is_filtered() -> Result<()> {
    let the_set: RequirementSet = serde_json::from_str(
        r#"[
            [
                {"resource": {"kind": "item", "index": 0}, "amount": 1},
                {"resource": {"kind": "item", "index": 1}, "amount": 1}
            ],
            [{"resource": {"kind": "item", "index": 0}, "amount": 1}]
        ]"#,
    )?;
    let (_, id_req_a) = make_req(0)?;
    assert_eq!(the_set, RequirementSet::new([RequirementList::new([id_req_a])]));

    let round_trip: RequirementSet = serde_json::from_str(&serde_json::to_string(&the_set)?)?;
    assert_eq!(round_trip, the_set);
    Ok(())
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_shared_across_threads() -> Result<()> {
    init_logging();
    assert_send_sync::<ResourceDatabase>();
    assert_send_sync::<RequirementSet>();

    let database = Arc::new(database()?);
    let reqs: Vec<IndividualRequirement> = (0..6)
        .map(|i| make_req(i).map(|(_, req)| req))
        .collect::<Result<_>>()?;
    let formula = Arc::new(
        RequirementSet::new([
            RequirementList::new([reqs[0], reqs[1]]),
            RequirementList::new([reqs[2]]),
        ])
        .merge(&RequirementSet::new([
            RequirementList::new([reqs[3]]),
            RequirementList::new([reqs[4], reqs[5]]),
        ])),
    );
    let (res_c, res_d) = (reqs[2].resource(), reqs[3].resource());
    let expected = formula.simplify(&[(res_c, 1), (res_d, 0)].into_iter().collect(), &database);

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let database = Arc::clone(&database);
            let formula = Arc::clone(&formula);
            std::thread::spawn(move || {
                let static_state: ResourceState = [(res_c, 1), (res_d, 0)].into_iter().collect();
                formula.simplify(&static_state, &database)
            })
        })
        .collect();
    for handle in handles {
        let result = match handle.join() {
            Ok(result) => result,
            Err(_) => bail!("worker thread panicked"),
        };
        assert_eq!(result, expected);
    }
    assert_eq!(
        expected,
        RequirementSet::new([RequirementList::new([reqs[4], reqs[5]])])
    );
    Ok(())
}
