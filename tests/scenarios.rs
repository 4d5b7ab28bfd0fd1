use dcopsim::prelude::*;

fn path_instance() -> DcopInstance {
    let m = || CostMatrix::from_rows(&[vec![1, 10], vec![10, 0]]).unwrap();
    let mut instance = DcopInstance::new(3, 2);
    instance.add_constraint(0, 1, m()).unwrap();
    instance.add_constraint(1, 2, m()).unwrap();
    instance.with_initial_values(&[1, 0, 1]).unwrap()
}

// Only a joint move of both agents reaches 0, any single move costs 20.
fn pair_trap() -> DcopInstance {
    let mut instance = DcopInstance::new(2, 2);
    instance
        .add_constraint(0, 1, CostMatrix::from_rows(&[vec![10, 20], vec![20, 0]]).unwrap())
        .unwrap();
    instance.with_initial_values(&[0, 0]).unwrap()
}

#[test]
fn mgm_solves_path_within_diameter_cycles() {
    let mut sim = Simulation::new(&path_instance(), SimConfig::default().with_algorithm("mgm").with_seed(1)).unwrap();
    assert_eq!(sim.global_cost(), 20);

    sim.run(4);
    assert_eq!(sim.final_global_cost(), 0);
    assert_eq!(sim.assignment(), vec![1, 1, 1]);
    assert!(sim.history().iter().all(|s| s.global_cost <= 20));
}

#[test]
fn converged_mgm_stays_put() {
    let mut sim = Simulation::new(&path_instance(), SimConfig::default().with_algorithm("mgm").with_seed(2)).unwrap();
    sim.run(4);
    let settled = sim.assignment();

    sim.run(20);
    assert_eq!(sim.assignment(), settled);
    assert!(sim.history()[4..].iter().all(|s| s.global_cost == 0));
}

#[test]
fn mgm_is_stuck_where_mgm2_is_not() {
    let mut mgm = Simulation::new(&pair_trap(), SimConfig::default().with_algorithm("mgm").with_seed(3)).unwrap();
    mgm.run(100);
    assert_eq!(mgm.final_global_cost(), 10);
    assert_eq!(mgm.assignment(), vec![0, 0]);

    let mut mgm2 = Simulation::new(&pair_trap(), SimConfig::default().with_algorithm("mgm2").with_seed(3)).unwrap();
    mgm2.run(500);
    assert_eq!(mgm2.final_global_cost(), 0);
    assert_eq!(mgm2.assignment(), vec![1, 1]);
}

#[test]
fn dsa_with_zero_probability_never_moves() {
    let instance = GeneratorConfig::new(15, 4).with_density(0.4, 1.0).with_seed(6).generate().unwrap();
    let params = AlgorithmParams::default().with_dsa_probability(0.0);
    let mut sim = Simulation::new(&instance, SimConfig::default().with_algorithm("dsa").with_params(params).with_seed(6)).unwrap();
    let start = sim.assignment();
    sim.run(30);
    assert_eq!(sim.assignment(), start);
}

#[test]
fn isolated_agents_keep_their_value() {
    let mut instance = DcopInstance::new(3, 3);
    instance
        .add_constraint(0, 1, CostMatrix::from_rows(&[vec![0, 1, 1], vec![1, 0, 1], vec![1, 1, 0]]).unwrap())
        .unwrap();
    let instance = instance.with_initial_values(&[0, 1, 2]).unwrap();

    for algorithm in ["dsa", "mgm", "mgm2"] {
        let mut sim = Simulation::new(&instance, SimConfig::default().with_algorithm(algorithm).with_seed(4)).unwrap();
        sim.run(25);
        assert_eq!(sim.value_of(2), Some(2), "{} moved an isolated agent", algorithm);
        assert_eq!(sim.value_of(3), None);
    }
}

#[test]
fn coloring_instances_never_get_worse_under_mgm() {
    let instance = GeneratorConfig::new(20, 3)
        .with_density(0.25, 1.0)
        .with_pattern(dcopsim::problem::CostPattern::Coloring)
        .with_seed(12)
        .generate()
        .unwrap();

    for algorithm in ["mgm", "mgm2"] {
        let mut sim = Simulation::new(&instance, SimConfig::default().with_algorithm(algorithm).with_seed(12)).unwrap();
        let initial = sim.global_cost();
        sim.run(150);
        assert_eq!(sim.history().len(), 151);
        assert!(sim.final_global_cost() <= initial, "{}: {} -> {}", algorithm, initial, sim.final_global_cost());
    }
}

#[test]
fn invalid_problems_are_rejected() {
    struct OneSided {
        matrix: CostMatrix,
    }

    impl Problem for OneSided {
        fn agent_count(&self) -> usize {
            2
        }
        fn domain_size(&self) -> usize {
            2
        }
        fn neighbors(&self, agent: AgentId) -> &[AgentId] {
            if agent == 0 { &[1][..] } else { &[] }
        }
        fn cost_matrix(&self, agent: AgentId, _neighbor: AgentId) -> Option<&CostMatrix> {
            (agent == 0).then_some(&self.matrix)
        }
        fn initial_value(&self, _agent: AgentId) -> Option<usize> {
            Some(0)
        }
    }

    let problem = OneSided { matrix: CostMatrix::zeros(2) };
    let err = Simulation::new(&problem, SimConfig::default()).err().unwrap();
    assert_eq!(err, DcopError::AsymmetricNeighbors { a: 0, b: 1 });
}
