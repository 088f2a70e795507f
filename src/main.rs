use pike_nfa::Regex;

fn main() {
    env_logger::init();

    println!("Thompson NFA / Pike matcher demo");
    println!("================================");

    let demos: &[(&str, &[&str])] = &[
        ("abc", &["abc", "abx"]),
        ("a.c", &["abc", "ac"]),
        ("a*", &["", "aaaa", "b"]),
        ("a+", &["", "aaa"]),
        ("ab?c", &["ac", "abc", "abbc"]),
        ("(ab)+", &["abab", "aba"]),
        ("cat|dog", &["cat", "dog", "cats"]),
        ("a\\*b", &["a*b", "aab"]),
        ("(a|b)*abb", &["ababb", "abab"]),
    ];

    for (pattern, inputs) in demos {
        println!("\n=== Pattern: {:?} ===", pattern);
        let re = match Regex::new(pattern) {
            Ok(re) => re,
            Err(err) => {
                println!("failed to compile: {}", err);
                continue;
            }
        };
        print!("{}", re.nfa());
        for input in *inputs {
            println!("  {:?} -> {}", input, re.is_match(input));
        }
    }

    // Malformed patterns surface typed errors rather than automata.
    for pattern in ["(ab", "a|"] {
        println!("\n=== Pattern: {:?} ===", pattern);
        match Regex::new(pattern) {
            Ok(_) => println!("compiled unexpectedly"),
            Err(err) => println!("error: {}", err),
        }
    }
}
