use cryptran_compiler::Target;
use cryptran_core::Colors;

pub fn run(color: bool) {
    print!("{}", render(Colors::new(color)));
}

pub fn render(colors: Colors) -> String {
    let mut out = String::new();
    for target in Target::ALL {
        out.push_str(&format!(
            "{}  {}\n",
            colors.name(&format!("{:<8} .{:<4}", target.name(), target.extension())),
            colors.note(target.description())
        ));
    }
    out
}
