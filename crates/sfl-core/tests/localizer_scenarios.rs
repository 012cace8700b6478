//! End-to-end localization scenarios over small, hand-checked spectra.

use sfl_core::localizer::{FaultLocalizer, FusingLocalizer, LevelLocalizer, LocalizeError};
use sfl_core::ranking::{NormalizationStrategy, NormalizedRanking, Ranking, RankingView};
use sfl_core::{Formula, FusionTechnique, SelectionTechnique};
use sfl_spectra::{Spectra, SpectraDump};

const DUMP: &str = r#"{
    "traces": [
        {"successful": false, "involved": ["S1", "S2"]},
        {"successful": false, "involved": ["S2", "S3"]},
        {"successful": true, "involved": ["S1"]},
        {"successful": true, "involved": ["S1", "S2", "S3"]},
        {"successful": true, "involved": ["S1", "S3"]}
    ],
    "levels": [
        {"P1": ["S1"], "P2": ["S2", "S3"]}
    ]
}"#;

fn leaf_spectra() -> Spectra<String> {
    SpectraDump::from_json_str(DUMP)
        .expect("dump should parse")
        .to_spectra()
}

fn s(id: &str) -> String {
    id.to_string()
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-3
}

// ============================================================================
// Single formula
// ============================================================================

mod single_formula {
    use super::*;

    #[test]
    fn tarantula_scores_and_positions() {
        let spectra = leaf_spectra();
        let ranking = FaultLocalizer::<String>::localize(&Formula::Tarantula, &spectra).unwrap();

        assert!(approx(ranking.suspiciousness(&s("S1")).unwrap(), 0.333));
        assert!(approx(ranking.suspiciousness(&s("S2")).unwrap(), 0.75));
        assert!(approx(ranking.suspiciousness(&s("S3")).unwrap(), 0.429));

        assert_eq!(ranking.wasted_effort(&s("S2")).unwrap(), 0);
        assert_eq!(ranking.wasted_effort(&s("S3")).unwrap(), 1);
        assert_eq!(ranking.wasted_effort(&s("S1")).unwrap(), 2);

        let order: Vec<String> = ranking.ordered().into_iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec![s("S2"), s("S3"), s("S1")]);
    }

    #[test]
    fn metrics_of_the_last_node() {
        let spectra = leaf_spectra();
        let ranking = FaultLocalizer::<String>::localize(&Formula::Tarantula, &spectra).unwrap();
        let metric = ranking.ranking_metrics(&s("S1")).unwrap();
        assert_eq!(metric.best_ranking, 3);
        assert_eq!(metric.worst_ranking, 3);
        assert_eq!(metric.total, 3);
        assert!(approx(metric.min_wasted_effort(), 2.0 / 3.0));
    }

    #[test]
    fn dump_survives_a_save_and_parse() {
        let spectra = leaf_spectra();
        let ranking = FaultLocalizer::<String>::localize(&Formula::Ochiai, &spectra).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ranking.txt");
        ranking.save(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: Ranking<String> = Ranking::parse_dump(&text).unwrap();
        assert_eq!(parsed.ordered(), ranking.ordered());
    }

    #[test]
    fn normalized_view_keeps_order() {
        let spectra = leaf_spectra();
        let ranking = FaultLocalizer::<String>::localize(&Formula::Tarantula, &spectra).unwrap();
        let normalized = NormalizedRanking::from_ranking(ranking, NormalizationStrategy::ZeroOne);

        assert!(approx(normalized.suspiciousness(&s("S2")).unwrap(), 1.0));
        assert!(approx(normalized.suspiciousness(&s("S1")).unwrap(), 0.0));
        let order: Vec<String> = normalized.ordered().into_iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec![s("S2"), s("S3"), s("S1")]);
    }
}

// ============================================================================
// Level localization
// ============================================================================

mod levels {
    use super::*;

    #[test]
    fn scores_accumulate_from_the_top_level() {
        let loaded = SpectraDump::from_json_str(DUMP).unwrap().to_hierarchy();
        let localizer: LevelLocalizer<String> =
            LevelLocalizer::from_formulas([Formula::Tarantula, Formula::Tarantula]);

        let ranking = localizer.localize(&*loaded.top).unwrap();
        assert_eq!(ranking.len(), 3);

        // P1 = 1/3, P2 = 0.6
        assert!(approx(ranking.suspiciousness(&s("S1")).unwrap(), 0.333 + 0.333));
        assert!(approx(ranking.suspiciousness(&s("S2")).unwrap(), 0.6 + 0.75));
        assert!(approx(ranking.suspiciousness(&s("S3")).unwrap(), 0.6 + 0.429));

        let order: Vec<String> = ranking.ordered().into_iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec![s("S2"), s("S3"), s("S1")]);
    }

    #[test]
    fn too_few_level_localizers() {
        let loaded = SpectraDump::from_json_str(DUMP).unwrap().to_hierarchy();
        let localizer: LevelLocalizer<String> = LevelLocalizer::from_formulas([Formula::Ochiai]);
        assert_eq!(
            localizer.localize(&*loaded.top).unwrap_err(),
            LocalizeError::MissingLevelLocalizer { level: 1 }
        );
    }
}

// ============================================================================
// Fusion
// ============================================================================

mod fusion {
    use super::*;

    #[test]
    fn fuses_every_formula() {
        let spectra = leaf_spectra();
        let localizer: FusingLocalizer<String> = FusingLocalizer::new(
            NormalizationStrategy::ZeroOne,
            SelectionTechnique::OverlapRate,
            FusionTechnique::CombSum,
        );
        assert_eq!(
            FaultLocalizer::<String>::name(&localizer),
            "F-ZeroOne-OverlapRate-CombSum"
        );

        let outcome = localizer.fuse(&spectra).unwrap();
        assert_eq!(outcome.selected.len(), 17);
        assert_eq!(outcome.scores.len(), 33);
        assert_eq!(outcome.ranking.len(), 3);
    }

    #[test]
    fn fused_ranking_matches_localize() {
        let spectra = leaf_spectra();
        let localizer: FusingLocalizer<String> = FusingLocalizer::new(
            NormalizationStrategy::ReciprocalRank,
            SelectionTechnique::BiasRate,
            FusionTechnique::CombMnz,
        );
        let outcome = localizer.fuse(&spectra).unwrap();
        let ranking = localizer.localize(&spectra).unwrap();
        assert_eq!(outcome.ranking.ordered(), ranking.ordered());
    }
}
