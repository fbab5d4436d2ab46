use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use xlcalc_common::{LiteralValue, RangeRef};
use xlcalc_eval::ast::ASTNode;
use xlcalc_eval::builtins::datetime::{business_days_until, workday};
use xlcalc_eval::test_workbook::TestWorkbook;

const MONDAY_2021_01_04: i64 = 44200;

fn bench_business_days(c: &mut Criterion) {
    let mut group = c.benchmark_group("BusinessDays");

    for holiday_count in [0usize, 50, 500] {
        // One holiday every third calendar day from the start.
        let holidays: Vec<i64> = (0..holiday_count as i64)
            .map(|i| MONDAY_2021_01_04 + i * 3)
            .collect();

        group.bench_with_input(
            BenchmarkId::new("Workday/+1000", holiday_count),
            &holidays,
            |b, hols| b.iter(|| workday(black_box(MONDAY_2021_01_04), black_box(1000), hols)),
        );

        group.bench_with_input(
            BenchmarkId::new("NetworkdaysCount/10y", holiday_count),
            &holidays,
            |b, hols| {
                b.iter(|| {
                    business_days_until(
                        black_box(MONDAY_2021_01_04),
                        black_box(MONDAY_2021_01_04 + 3652),
                        hols,
                    )
                })
            },
        );
    }
    group.finish();
}

fn bench_interpreter(c: &mut Criterion) {
    let mut group = c.benchmark_group("Interpreter");

    let rows: Vec<Vec<LiteralValue>> = (0..365)
        .map(|i| vec![LiteralValue::Number((MONDAY_2021_01_04 + i * 7) as f64)])
        .collect();
    let wb = TestWorkbook::new().with_range("Sheet1", 1, 1, rows);
    let holidays = ASTNode::reference(RangeRef::new(1, 1, 365, 1).unwrap());
    let node = ASTNode::call(
        "NETWORKDAYS",
        vec![
            ASTNode::number(MONDAY_2021_01_04 as f64),
            ASTNode::number((MONDAY_2021_01_04 + 3652) as f64),
            holidays,
        ],
    );
    let interp = wb.interpreter().unwrap();

    group.bench_function("NETWORKDAYS/range-holidays", |b| {
        b.iter(|| interp.evaluate(black_box(&node)))
    });

    let years = ASTNode::array(
        (0..100)
            .map(|i| vec![ASTNode::number((MONDAY_2021_01_04 + i * 30) as f64)])
            .collect(),
    );
    let year_call = ASTNode::call("YEAR", vec![years]);
    group.bench_function("YEAR/broadcast-100", |b| {
        b.iter(|| interp.evaluate(black_box(&year_call)))
    });
    group.finish();
}

criterion_group!(benches, bench_business_days, bench_interpreter);
criterion_main!(benches);
