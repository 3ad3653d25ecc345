use criterion::{black_box, criterion_group, criterion_main, Criterion};

use orthosim::annotations::{AnnotationSet, OrthologPair};
use orthosim::ic::InformationContent;
use orthosim::term::{GoAspect, GoTermId};
use orthosim::OverlapScorer;

fn synthetic_closure(offset: u32, len: u32) -> AnnotationSet {
    AnnotationSet::from_terms(
        (offset..offset + len).map(|id| {
            let aspect = if id % 3 == 0 {
                GoAspect::MolecularFunction
            } else {
                GoAspect::BiologicalProcess
            };
            (GoTermId::from(id), aspect)
        }),
        GoAspect::BiologicalProcess,
    )
}

fn scoring_benchmark(c: &mut Criterion) {
    let ic: InformationContent = (0u32..2000)
        .map(|id| (GoTermId::from(id), f64::from(id % 17)))
        .collect();

    let pair = OrthologPair::new(1u32.into(), 2u32.into());
    let scorer = OverlapScorer::new(&ic);

    let query = synthetic_closure(0, 600);
    let model = synthetic_closure(300, 600);
    c.bench_function("score 600-term closures", |b| {
        b.iter(|| {
            scorer.score(
                black_box(&pair),
                black_box(&query),
                black_box(&model),
            )
        })
    });

    let small_query = synthetic_closure(0, 40);
    let small_model = synthetic_closure(20, 40);
    c.bench_function("score 40-term closures", |b| {
        b.iter(|| {
            scorer.score(
                black_box(&pair),
                black_box(&small_query),
                black_box(&small_model),
            )
        })
    });
}

criterion_group!(scoring, scoring_benchmark);
criterion_main!(scoring);
