use bigdecimal::BigDecimal;

use super::schemas::{Order, ShippingAddress};

/// Escapes the five HTML-significant characters. Every user-supplied field
/// passes through here before being spliced into the document.
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Joins the non-empty postal parts with ", "; "N/A" when nothing is set.
pub fn format_address(address: &ShippingAddress) -> String {
    let parts: Vec<&str> = [
        address.street.as_str(),
        address.barangay.as_str(),
        address.city.as_str(),
        address.province.as_str(),
        address.zip.as_str(),
    ]
    .into_iter()
    .filter(|part| !part.trim().is_empty())
    .collect();
    if parts.is_empty() {
        "N/A".to_string()
    } else {
        parts.join(", ")
    }
}

fn format_amount(amount: &BigDecimal) -> String {
    format!("₱{}", amount.with_scale(2))
}

fn render_order_section(order: &Order, brand_name: &str) -> String {
    let mut rows = String::new();
    for item in &order.items {
        // Line totals are recomputed here, never trusted from the payload.
        let line_total = &item.unit_price * BigDecimal::from(item.quantity);
        let label = item
            .label
            .as_deref()
            .filter(|label| !label.is_empty())
            .map(|label| format!(" ({})", escape_html(label)))
            .unwrap_or_default();
        let image = item
            .image_url
            .as_deref()
            .map(|url| format!(r#"<img src="{}" alt="" width="32" />"#, escape_html(url)))
            .unwrap_or_default();
        rows.push_str(&format!(
            "<tr><td>{image}{name}{label}</td><td>{qty}</td><td>{price}</td><td>{total}</td></tr>\n",
            image = image,
            name = escape_html(&item.name),
            label = label,
            qty = item.quantity,
            price = format_amount(&item.unit_price),
            total = format_amount(&line_total),
        ));
    }

    let subtotal = &order.sub_total + &order.shipping_fee;
    format!(
        r#"<section class="receipt">
<h1>{brand}</h1>
<p class="meta">Order {order_id} · {date}</p>
<p class="meta">Status: {status} · Payment: {method} ({payment_status})</p>
<p class="meta">Tracking No: {tracking}</p>
<p class="meta">Customer: {customer}</p>
<p class="meta">Ship to: {address}</p>
<table>
<thead><tr><th>Item</th><th>Qty</th><th>Price</th><th>Total</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
<p class="totals">Shipping Fee: {shipping}</p>
<p class="totals">Subtotal: {subtotal}</p>
</section>
"#,
        brand = escape_html(brand_name),
        order_id = escape_html(&order.order_id),
        date = order.created_on.format("%Y-%m-%d %H:%M"),
        status = order.status.label(),
        method = order.payment_method.label(),
        payment_status = order.payment_status.label(),
        tracking = escape_html(order.tracking_number.as_deref().unwrap_or("N/A")),
        customer = escape_html(&order.customer_name),
        address = escape_html(&format_address(&order.shipping_address)),
        rows = rows,
        shipping = format_amount(&order.shipping_fee),
        subtotal = format_amount(&subtotal),
    )
}

/// Builds one self-contained printable document for the given orders.
/// Multiple orders are separated by forced page breaks; the embedded script
/// waits for every image to load or error before opening the print dialog.
pub fn build_receipt_document(orders: &[Order], brand_name: &str) -> String {
    let sections: Vec<String> = orders
        .iter()
        .map(|order| render_order_section(order, brand_name))
        .collect();
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8" />
<title>Receipts</title>
<style>
body {{ font-family: sans-serif; margin: 24px; }}
.receipt {{ page-break-after: always; }}
.receipt:last-child {{ page-break-after: auto; }}
table {{ width: 100%; border-collapse: collapse; }}
th, td {{ border-bottom: 1px solid #ccc; padding: 4px; text-align: left; }}
.totals {{ text-align: right; }}
</style>
</head>
<body>
{sections}<script>
(function () {{
  var images = Array.prototype.slice.call(document.images);
  var pending = images.length;
  function done() {{ if (--pending <= 0) window.print(); }}
  if (pending === 0) {{ window.print(); return; }}
  images.forEach(function (img) {{
    if (img.complete) {{ done(); return; }}
    img.addEventListener('load', done);
    img.addEventListener('error', done);
  }});
}})();
</script>
</body>
</html>
"#,
        sections = sections.join(""),
    )
}
