pub mod context;

/// Builds a page template that shows the first `n` users of the context.
///
/// Every section exercises a different tag, so the template covers the
/// whole tokenizer and compiler.
pub fn page(n: usize) -> String {
    let mut s = String::from(
        "<%# Template Name: page %>\n\
         <html>\n  <head><title><%= title %></title></head>\n  <body>\n",
    );
    for i in 0..n {
        s.push_str(&format!(
            "    <% var user = users.{i} -%>\n\
             <div class=\"user\">\n\
             \x20     <h2><%= user.name %></h2>\n\
             \x20     <p>age <%- user.age %>, disabled <%= user.is_disabled; %></p>\n\
             \x20     <p><%% literal %%></p>\n\
             \x20   </div>\n"
        ));
    }
    s.push_str("  </body>\n</html>\n");
    s
}
