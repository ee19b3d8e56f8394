use super::*;

fn candidate(surface_raw: &str, features: &[(&str, f64)], score: Option<f64>) -> Candidate {
    let mut c = Candidate::hypothesis(surface_raw);
    for &(k, w) in features {
        c.features.set(k, w);
    }
    c.score = score;
    c
}

fn model_of(pairs: &[(&str, f64)]) -> SparseVector {
    let mut m = SparseVector::new();
    for &(k, w) in pairs {
        m.set(k, w);
    }
    m
}

#[test]
fn test_rule_from_str() {
    assert_eq!("structured".parse::<UpdateRule>(), Ok(UpdateRule::Structured));
    assert_eq!("ranking".parse::<UpdateRule>(), Ok(UpdateRule::Ranking));
    let err = "perceptron".parse::<UpdateRule>().unwrap_err();
    assert!(err.to_string().contains("perceptron"));
    assert_eq!(UpdateRule::Ranking.to_string(), "ranking");
}

#[test]
fn test_structured_noop_on_equal_surface() {
    let hyp = candidate("le chat |0-1|", &[("a", 1.0)], Some(5.0));
    let oracle = candidate("le chat |0| |1|", &[("b", 3.0)], Some(-1.0));
    let mut model = model_of(&[("a", 0.5)]);
    let before = model.clone();
    assert!(!structured_update(&mut model, &hyp, &oracle, 1.0));
    assert_eq!(model, before);
}

#[test]
fn test_structured_update_scaled() {
    let hyp = candidate("un chien |0-1|", &[("a", 1.0), ("shared", 2.0)], Some(1.0));
    let oracle = candidate("le chat |0-1|", &[("b", 2.0), ("shared", 1.0)], Some(3.0));
    let mut model = model_of(&[("a", 1.0)]);
    assert!(structured_update(&mut model, &hyp, &oracle, 0.5));
    assert_eq!(model.get("a"), 0.5);
    assert_eq!(model.get("b"), 1.0);
    assert_eq!(model.get("shared"), -0.5);
}

#[test]
fn test_structured_fires_even_when_oracle_wins() {
    let hyp = candidate("un chien |0-1|", &[("a", 1.0)], Some(0.0));
    let oracle = candidate("le chat |0-1|", &[("b", 1.0)], Some(10.0));
    let mut model = SparseVector::new();
    assert!(structured_update(&mut model, &hyp, &oracle, 1.0));
    assert_eq!(model.get("b"), 1.0);
}

#[test]
fn test_ranking_noop_when_oracle_strictly_better() {
    let hyp = candidate("un chien |0-1|", &[("a", 1.0)], Some(1.0));
    let oracle = candidate("le chat |0-1|", &[("b", 1.0)], Some(1.5));
    let mut model = model_of(&[("a", 1.0), ("b", 1.5)]);
    let before = model.clone();
    assert!(!ranking_update(&mut model, &hyp, &oracle, 1.0));
    assert_eq!(model, before);
}

#[test]
fn test_ranking_fires_on_tie() {
    let hyp = candidate("un chien |0-1|", &[("a", 1.0)], Some(2.0));
    let oracle = candidate("le chat |0-1|", &[("b", 1.0)], Some(2.0));
    let mut model = SparseVector::new();
    assert!(ranking_update(&mut model, &hyp, &oracle, 2.0));
    assert_eq!(model.get("a"), -2.0);
    assert_eq!(model.get("b"), 2.0);
}

#[test]
fn test_ranking_noop_on_equal_surface() {
    let hyp = candidate("le chat |0-1|", &[("a", 1.0)], Some(2.0));
    let oracle = candidate("le chat |0-1|", &[("b", 1.0)], Some(0.0));
    let mut model = SparseVector::new();
    assert!(!UpdateRule::Ranking.apply(&mut model, &hyp, &oracle, 1.0));
    assert!(model.is_empty());
}

#[test]
fn test_unscored_oracle_never_outranks() {
    let hyp = candidate("un chien |0-1|", &[], None);
    let oracle = candidate("le chat |0-1|", &[("b", 1.0)], None);
    let mut model = SparseVector::new();
    assert!(ranking_update(&mut model, &hyp, &oracle, 1.0));
}

#[test]
fn test_best_index_stable() {
    let list = vec![
        candidate("a |0|", &[], Some(1.0)),
        candidate("b |0|", &[], Some(3.0)),
        candidate("c |0|", &[], Some(3.0)),
    ];
    assert_eq!(best_index(&list), Some(1));
    assert_eq!(best_index(&[]), None);
}

#[test]
fn test_best_index_unscored() {
    let list = vec![candidate("a |0|", &[], None), candidate("b |0|", &[], None)];
    assert_eq!(best_index(&list), Some(0));
    let list = vec![candidate("a |0|", &[], None), candidate("b |0|", &[], Some(-5.0))];
    assert_eq!(best_index(&list), Some(1));
}

#[test]
fn test_score_all() {
    let mut list = vec![
        candidate("a |0|", &[("x", 1.0)], None),
        candidate("b |0|", &[("y", 1.0)], None),
    ];
    score_all(&mut list, &model_of(&[("y", 2.0)]));
    assert_eq!(list[0].score, Some(0.0));
    assert_eq!(list[1].score, Some(2.0));
    assert_eq!(best_index(&list), Some(1));
}
