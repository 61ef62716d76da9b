use printpdf::{
    BuiltinFont, Color, Image as PdfImage, ImageTransform, Line, Mm, PdfDocument, Point, Rgb,
};

use crate::config::EventDetails;
use crate::domain::errors::DomainError;
use crate::domain::order::Order;
use crate::domain::ticket::Ticket;

// A5 portrait
const PAGE_W: f32 = 148.0;
const PAGE_H: f32 = 210.0;
const QR_X: f32 = 49.0;
const QR_Y: f32 = 28.0;
const QR_SIDE: f32 = 50.0;

/// Renders one single-page ticket PDF per minted ticket. The output is only
/// ever attached to an email, never parsed back, so layout is fixed and
/// deliberately simple.
pub struct PdfRenderer {
    event: EventDetails,
}

impl PdfRenderer {
    pub fn new(event: EventDetails) -> Self {
        Self { event }
    }

    pub fn render(&self, ticket: &Ticket, order: &Order) -> Result<Vec<u8>, DomainError> {
        let (doc, page, layer) = PdfDocument::new("Event Ticket", Mm(PAGE_W), Mm(PAGE_H), "ticket");
        let layer = doc.get_page(page).get_layer(layer);

        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let oblique = doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(pdf_error)?;

        layer.set_fill_color(Color::Rgb(Rgb::new(0.04, 0.12, 0.27, None)));
        layer.use_text(&self.event.name, 24.0, Mm(18.0), Mm(188.0), &bold);
        layer.set_fill_color(Color::Rgb(Rgb::new(0.83, 0.69, 0.22, None)));
        layer.use_text(&self.event.tagline, 12.0, Mm(18.0), Mm(179.0), &oblique);

        layer.set_fill_color(Color::Rgb(Rgb::new(0.2, 0.2, 0.2, None)));
        let mut y = 162.0;
        for (label, value) in [
            ("TICKET TYPE", ticket.ticket_type.as_str()),
            ("TICKET HOLDER", ticket.attendee_name.as_str()),
            ("TICKET CODE", ticket.ticket_code.as_str()),
            ("ORDER REFERENCE", order.order_ref.as_str()),
            ("EVENT DATE", self.event.date.as_str()),
            ("LOCATION", self.event.location.as_str()),
        ] {
            layer.use_text(label, 9.0, Mm(18.0), Mm(y), &regular);
            layer.use_text(value, 11.0, Mm(66.0), Mm(y), &bold);
            y -= 10.0;
        }

        self.place_qr(&layer, ticket, &regular);

        layer.set_fill_color(Color::Rgb(Rgb::new(0.4, 0.4, 0.4, None)));
        layer.use_text(
            "This ticket is non-transferable without prior authorization.",
            8.0,
            Mm(18.0),
            Mm(18.0),
            &regular,
        );
        layer.use_text(
            "Present this ticket at registration for entry.",
            8.0,
            Mm(18.0),
            Mm(13.0),
            &regular,
        );

        doc.save_to_bytes().map_err(pdf_error)
    }

    /// Embed the stored QR PNG. An unreadable image degrades to a placeholder
    /// frame instead of failing the whole render.
    ///
    /// Decoding goes through `printpdf::image_crate` so the decoded type
    /// matches the `image` version printpdf links against; the minting path
    /// encodes with its own `image` and the two only meet as PNG bytes.
    fn place_qr(
        &self,
        layer: &printpdf::PdfLayerReference,
        ticket: &Ticket,
        font: &printpdf::IndirectFontRef,
    ) {
        match printpdf::image_crate::load_from_memory(&ticket.qr_png) {
            Ok(qr) => {
                let dpi = 150.0;
                let img = PdfImage::from_dynamic_image(&qr);
                img.add_to_layer(
                    layer.clone(),
                    ImageTransform {
                        translate_x: Some(Mm(QR_X)),
                        translate_y: Some(Mm(QR_Y)),
                        dpi: Some(dpi),
                        ..Default::default()
                    },
                );
            }
            Err(e) => {
                log::warn!(
                    "QR image for ticket {} is unreadable ({}), rendering placeholder",
                    ticket.ticket_code,
                    e
                );
                let frame = Line {
                    points: vec![
                        (Point::new(Mm(QR_X), Mm(QR_Y)), false),
                        (Point::new(Mm(QR_X + QR_SIDE), Mm(QR_Y)), false),
                        (Point::new(Mm(QR_X + QR_SIDE), Mm(QR_Y + QR_SIDE)), false),
                        (Point::new(Mm(QR_X), Mm(QR_Y + QR_SIDE)), false),
                    ],
                    is_closed: true,
                };
                layer.set_outline_color(Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None)));
                layer.set_outline_thickness(1.0);
                layer.add_line(frame);
                layer.set_fill_color(Color::Rgb(Rgb::new(0.6, 0.6, 0.6, None)));
                layer.use_text(
                    "QR CODE",
                    9.0,
                    Mm(QR_X + 16.0),
                    Mm(QR_Y + QR_SIDE / 2.0),
                    font,
                );
            }
        }
    }
}

fn pdf_error(e: printpdf::Error) -> DomainError {
    DomainError::Internal(format!("PDF rendering failed: {}", e))
}
