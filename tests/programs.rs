mod common;

use common::{compile_all, Machine};
use jackc::{compile, CompilerOptions, ErrorCategory};

#[test]
fn array_destination_survives_rhs_indexing() {
    let classes = compile_all(&[r#"
        class Main {
            static Array a;

            function int doubled(int k) {
                return a[k] * 2;
            }

            function int main() {
                let a = Array.new(4);
                let a[0] = 5;
                let a[1] = 7;
                let a[2] = 0;
                let a[3] = 0;
                // both right-hand sides move pointer 1 before the store happens
                let a[2] = Main.doubled(a[0] - 4);
                let a[3] = a[a[0] - 4] + 1;
                return (a[2] * 10) + a[3];
            }
        }
    "#]);
    let mut machine = Machine::load(&classes);
    assert_eq!(machine.run("Main.main"), 148);

    let a = machine.static_value("Main", 0) as usize;
    let cells: Vec<_> = (0..4).map(|i| machine.ram(a + i)).collect();
    assert_eq!(cells, vec![5, 7, 14, 8]);
}

#[test]
fn objects_and_method_dispatch() {
    let classes = compile_all(&[
        r#"
        class Point {
            field int x, y;

            constructor Point new(int ax, int ay) {
                let x = ax;
                let y = ay;
                return this;
            }

            method int getX() { return x; }
            method int getY() { return y; }

            /** x*x' + y*y' */
            method int dot(Point other) {
                return (x * other.getX()) + (y * other.getY());
            }
        }
        "#,
        r#"
        class Main {
            function int main() {
                var Point p, q;
                let p = Point.new(2, 3);
                let q = Point.new(4, 5);
                return p.dot(q);
            }
        }
        "#,
    ]);
    let mut machine = Machine::load(&classes);
    assert_eq!(machine.run("Main.main"), 23);
}

#[test]
fn loops_and_branches() {
    let classes = compile_all(&[r#"
        class Main {
            function int main() {
                var int i, sum;
                let i = 0;
                let sum = 0;
                while (i < 10) {
                    let i = i + 1;
                    if ((i & 1) = 0) {
                        let sum = sum + i;
                    } else {
                        let sum = sum - 1;
                    }
                }
                return sum;
            }
        }
    "#]);
    let mut machine = Machine::load(&classes);
    assert_eq!(machine.run("Main.main"), 25);
}

#[test]
fn boolean_encoding_and_discarded_calls() {
    let classes = compile_all(&[r#"
        class Main {
            static int calls;

            function int bump() {
                let calls = calls + 1;
                return calls;
            }

            function int main() {
                do Main.bump();
                do Main.bump();
                if (true & ~false & ~(1 = 2)) {
                    return -calls;
                }
                return 0;
            }
        }
    "#]);
    let mut machine = Machine::load(&classes);
    assert_eq!(machine.run("Main.main"), -2);
    // `do` popped both results, so main's frame is balanced and calls ran twice
    assert_eq!(machine.static_value("Main", 0), 2);
}

#[test]
fn string_constants_build_string_objects() {
    let classes = compile_all(&[r#"
        class Main {
            function String main() {
                return "Jack!";
            }
        }
    "#]);
    let mut machine = Machine::load(&classes);
    let pointer = machine.run("Main.main");
    assert_eq!(machine.string_at(pointer), "Jack!");
}

#[test]
fn unqualified_method_calls_keep_the_receiver() {
    let classes = compile_all(&[
        r#"
        class Counter {
            field int count;

            constructor Counter new() {
                let count = 0;
                return this;
            }

            method void inc(int by) {
                let count = count + by;
                return;
            }

            method int incTwice() {
                do inc(3);
                do inc(4);
                return count;
            }
        }
        "#,
        r#"
        class Main {
            function int main() {
                var Counter c;
                let c = Counter.new();
                return c.incTwice();
            }
        }
        "#,
    ]);
    let mut machine = Machine::load(&classes);
    assert_eq!(machine.run("Main.main"), 7);
}

#[test]
fn a_failed_unit_does_not_affect_the_next() {
    let options = CompilerOptions::default();
    let bad = compile("class Bad { function void f() { let = 1; } }", &options);
    assert_eq!(bad.unwrap_err().category(), ErrorCategory::Syntax);

    let good = compile(
        "class Good { function int f() { if (true) { return 1; } return 0; } }",
        &options,
    )
    .unwrap();
    // fresh session: labels start over at L0
    assert!(good.to_string().contains("if-goto L0\n"));
}
