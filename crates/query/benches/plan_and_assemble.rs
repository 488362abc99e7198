use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use catalog_core::{BcgTag, ItemId, TenantId, Visibility};
use catalog_query::cursor;
use catalog_query::filter::{CatalogQueryParams, compile};
use catalog_query::row::{FlatItemRow, ItemCore, ItemRow};
use catalog_query::strategy::{EntryPoint, select};
use catalog_query::{CursorPayload, ResultAssembler};
use chrono::{Duration, TimeZone, Utc};
use rust_decimal::Decimal;

fn sample_rows(n: usize) -> Vec<ItemRow> {
    let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            ItemRow::Flat(FlatItemRow {
                core: ItemCore {
                    id: ItemId::new(format!("item-{i:06}")).unwrap(),
                    tenant_id: TenantId::new("tenant-bench").unwrap(),
                    store_id: None,
                    title: format!("Benchmark item {i}"),
                    sku: Some(format!("SKU-{i:06}")),
                    barcode: None,
                    bcg_tag: BcgTag::Star,
                    item_type: "PRODUCT".into(),
                    visibility: Visibility::Visible,
                    is_featured: i % 7 == 0,
                    sell_unit: "UNIT".into(),
                    tax_rate: None,
                    thumbnail_url: None,
                    created_at: base + Duration::seconds(i as i64),
                    updated_at: base + Duration::seconds(i as i64),
                },
                brand_name: Some("Brand".into()),
                primary_category_name: Some("Category".into()),
                on_hand: Some(Decimal::from(i as i64)),
                reserved: Some(Decimal::ONE),
                reorder_point: Some(Decimal::TEN),
                lot_code: None,
                expires_at: None,
            })
        })
        .collect()
}

fn bench_compile_and_select(c: &mut Criterion) {
    let mut group = c.benchmark_group("plan");

    let offset = CatalogQueryParams {
        q: Some("milk".into()),
        tenant_id: Some("tenant-bench".into()),
        store_id: Some("store-1".into()),
        sort_by: Some("stockOnHand".into()),
        sort_dir: Some("asc".into()),
        page: Some(4),
        limit: Some(50),
        ..Default::default()
    };
    group.bench_function("offset_inventory_join", |b| {
        b.iter(|| {
            let compiled = compile(black_box(&offset)).unwrap();
            black_box(select(compiled, EntryPoint::List).unwrap())
        })
    });

    let token = cursor::encode(&CursorPayload::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap(),
        ItemId::new("item-000123").unwrap(),
    ));
    let seek = CatalogQueryParams {
        tenant_id: Some("tenant-bench".into()),
        cursor: Some(token),
        limit: Some(50),
        ..Default::default()
    };
    group.bench_function("seek_with_cursor", |b| {
        b.iter(|| {
            let compiled = compile(black_box(&seek)).unwrap();
            black_box(select(compiled, EntryPoint::Feed).unwrap())
        })
    });

    group.finish();
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");
    let assembler = ResultAssembler::default();

    for size in [20usize, 100, 250] {
        let rows = sample_rows(size);
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("flat_rows", size), &rows, |b, rows| {
            b.iter(|| black_box(assembler.assemble_all(rows)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_compile_and_select, bench_assemble);
criterion_main!(benches);
