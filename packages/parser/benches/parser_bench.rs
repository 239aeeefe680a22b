use criterion::{black_box, criterion_group, criterion_main, Criterion};
use paren_parser::{parse, serialize};

fn parse_small_form(c: &mut Criterion) {
    let source = r#"
        (defn greet
          "Say hello"
          [name]
          (str "Hello, " name "!"))
    "#;

    c.bench_function("parse_small_form", |b| {
        b.iter(|| parse(black_box(source)))
    });
}

fn parse_namespace(c: &mut Criterion) {
    let source = r#"
        (ns app.handlers
          (:require [clojure.string :as str]
                    [app.db :refer [query]]))

        (def ^:private defaults {:limit 10, :offset 0})

        (defn list-users
          [{:keys [limit offset] :or {limit 10}}]
          (->> (query :users)
               (drop offset)
               (take limit)
               (map #(update % :name str/capitalize))))

        #?(:clj (defn now [] (java.util.Date.))
           :cljs (defn now [] (js/Date.)))
    "#;

    c.bench_function("parse_namespace", |b| {
        b.iter(|| parse(black_box(source)))
    });
}

fn parse_large_file(c: &mut Criterion) {
    let mut source = String::new();
    for i in 0..1000 {
        source.push_str(&format!(
            "(defn handler-{} [req]\n  ;; handler {}\n  (let [x (get req :x {})]\n    (inc x)))\n\n",
            i, i
        ));
    }

    c.bench_function("parse_large_file_1000_forms", |b| {
        b.iter(|| parse(black_box(&source)))
    });
}

fn roundtrip_large_file(c: &mut Criterion) {
    let mut source = String::new();
    for i in 0..1000 {
        source.push_str(&format!("(def value-{} [{} {{:k {}}}])\n", i, i, i));
    }
    let tree = parse(&source).expect("bench source parses");

    c.bench_function("serialize_large_file", |b| {
        b.iter(|| serialize(black_box(&tree)))
    });
}

fn tokenize_only(c: &mut Criterion) {
    use paren_parser::tokenize;

    let source = r#"(defn f [x] (-> x (assoc :a 1) (update :b inc)))"#;

    c.bench_function("tokenize_only", |b| {
        b.iter(|| tokenize(black_box(source)))
    });
}

criterion_group!(
    benches,
    parse_small_form,
    parse_namespace,
    parse_large_file,
    roundtrip_large_file,
    tokenize_only
);
criterion_main!(benches);
